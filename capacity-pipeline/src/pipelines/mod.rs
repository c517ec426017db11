pub mod risk_dashboard;
