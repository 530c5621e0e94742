pub mod bar;
pub mod bar_series;
pub mod table;
pub mod timeframe;
