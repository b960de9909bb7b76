pub mod classifier;
pub mod geocode;
pub mod oracle;
pub mod prediction;
pub mod routing;
