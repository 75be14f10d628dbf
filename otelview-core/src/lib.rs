pub mod config;
pub mod filter;
pub mod history;
pub mod props;
pub mod signal;
pub mod telemetry;

// Tree → signal pipeline
pub mod ingest;
pub mod normalize;
pub mod protobuf;

// Interactive dashboard
pub mod dashboard;
pub mod heartbeat;
