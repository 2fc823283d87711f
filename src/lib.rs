pub mod calibration;
pub mod config;
pub mod dataset;
pub mod export;
pub mod fetch;
pub mod http_client;
pub mod league_report;
pub mod leagues;
pub mod logging;
pub mod markets;
pub mod match_record;
pub mod odds;
pub mod rankings;
pub mod scoreline;
pub mod sheet_parse;
pub mod slate;
pub mod streaks;
pub mod synthetic;
pub mod team_form;
pub mod weighting;
