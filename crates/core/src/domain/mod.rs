pub mod market;
pub mod news;
pub mod profile;
pub mod record;
pub mod scores;
pub mod ticker;
