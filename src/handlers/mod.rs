pub mod inventory;
pub mod reports;
pub mod sites;
pub mod system;
pub mod transfers;
