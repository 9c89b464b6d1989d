//! Expense and income analysis, grouped by expense project or income remark.

mod expenses;
mod income;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, date_window::DateWindow, enquiry::Mode};

pub use expenses::expenses_analysis_endpoint;
pub use income::income_analysis_endpoint;

#[derive(Debug, Clone)]
pub struct AnalysisState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalysisState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string shared by the analysis endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalysisQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub code: Option<String>,
    pub mode: Option<String>,
}

impl AnalysisQuery {
    fn window(&self) -> Result<DateWindow, Error> {
        DateWindow::parse(self.start.as_deref(), self.end.as_deref())
    }

    /// The code to filter on, or `None` for every code.
    fn code(&self) -> Option<&str> {
        match self.code.as_deref().map(str::trim) {
            None | Some("") | Some("ALL") => None,
            Some(code) => Some(code),
        }
    }

    fn mode(&self) -> Mode {
        Mode::parse(self.mode.as_deref())
    }
}
