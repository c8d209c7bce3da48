pub mod ledger;
pub mod sites;
