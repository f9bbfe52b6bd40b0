pub mod ledger;
pub mod schema;
pub mod vocab;
