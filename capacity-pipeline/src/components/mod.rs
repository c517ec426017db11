pub mod high_risk_filter;
pub mod merged_table_source;
pub mod org_filter;
pub mod quarter_window_filter;
pub mod risk_rank_selector;
pub mod sku_filter;
