use ratatui::widgets::TableState;
use std::sync::mpsc;

use crate::models::{ProjectStats, SourceInfo, Statistics};
use crate::theme::{load_saved_theme, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Projects,
    Models,
}

/// Messages from background data loading
pub enum LoadMessage {
    Progress(String),
    Done(Vec<(SourceInfo, Statistics)>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Sessions,
    Messages,
    Tokens,
    Time,
    Cost,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Sessions,
            SortColumn::Sessions => SortColumn::Messages,
            SortColumn::Messages => SortColumn::Tokens,
            SortColumn::Tokens => SortColumn::Time,
            SortColumn::Time => SortColumn::Cost,
            SortColumn::Cost => SortColumn::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Sessions => "Sessions",
            SortColumn::Messages => "Messages",
            SortColumn::Tokens => "Tokens",
            SortColumn::Time => "Time",
            SortColumn::Cost => "Cost",
        }
    }
}

pub struct App {
    pub sources: Vec<(SourceInfo, Statistics)>,
    pub current_source: usize,
    /// Projects of the current source, in map order.
    pub projects: Vec<(String, ProjectStats)>,
    pub filtered_projects: Vec<usize>, // indices into projects
    pub view: View,
    pub input_mode: InputMode,
    pub search_query: String,
    pub sort_column: SortColumn,
    pub theme: Theme,
    pub project_table_state: TableState,
    pub selected_project: usize, // index into filtered_projects
    pub should_quit: bool,
    // Async loading
    pub loading: bool,
    pub loading_status: String,
    pub load_error: Option<String>,
    pub load_receiver: Option<mpsc::Receiver<LoadMessage>>,
}

impl App {
    /// Create an app in loading state
    pub fn loading(rx: mpsc::Receiver<LoadMessage>) -> Self {
        Self {
            sources: Vec::new(),
            current_source: 0,
            projects: Vec::new(),
            filtered_projects: Vec::new(),
            view: View::Dashboard,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            sort_column: SortColumn::Cost,
            theme: load_saved_theme(),
            project_table_state: TableState::default(),
            selected_project: 0,
            should_quit: false,
            loading: true,
            loading_status: "Starting...".to_string(),
            load_error: None,
            load_receiver: Some(rx),
        }
    }

    /// Check if background loading has completed or has progress updates
    pub fn poll_load(&mut self) {
        if !self.loading {
            return;
        }
        let Some(ref rx) = self.load_receiver else {
            return;
        };
        // Drain all available messages
        let mut done = None;
        while let Ok(msg) = rx.try_recv() {
            match msg {
                LoadMessage::Progress(status) => self.loading_status = status,
                LoadMessage::Done(sources) => {
                    done = Some(sources);
                    break;
                }
                LoadMessage::Failed(err) => {
                    self.load_error = Some(err);
                    self.loading = false;
                    self.load_receiver = None;
                    return;
                }
            }
        }
        if let Some(sources) = done {
            self.sources = sources;
            self.loading = false;
            self.load_receiver = None;
            self.select_source(0);
        }
    }

    pub fn current(&self) -> Option<&(SourceInfo, Statistics)> {
        self.sources.get(self.current_source)
    }

    pub fn current_stats(&self) -> Option<&Statistics> {
        self.current().map(|(_, s)| s)
    }

    pub fn select_source(&mut self, idx: usize) {
        self.current_source = idx;
        self.projects = self
            .current_stats()
            .map(|s| {
                s.projects
                    .iter()
                    .map(|(name, p)| (name.clone(), p.clone()))
                    .collect()
            })
            .unwrap_or_default();
        self.apply_filter();
    }

    pub fn next_source(&mut self) {
        if self.sources.len() > 1 {
            self.select_source((self.current_source + 1) % self.sources.len());
        }
    }

    pub fn move_up(&mut self) {
        if self.view == View::Projects && self.selected_project > 0 {
            self.selected_project -= 1;
            self.project_table_state.select(Some(self.selected_project));
        }
    }

    pub fn move_down(&mut self) {
        if self.view == View::Projects {
            let max = self.filtered_projects.len().saturating_sub(1);
            if self.selected_project < max {
                self.selected_project += 1;
                self.project_table_state.select(Some(self.selected_project));
            }
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..10 {
            self.move_up();
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..10 {
            self.move_down();
        }
    }

    pub fn go_home(&mut self) {
        if self.view == View::Projects && !self.filtered_projects.is_empty() {
            self.selected_project = 0;
            self.project_table_state.select(Some(0));
        }
    }

    pub fn go_end(&mut self) {
        if self.view == View::Projects && !self.filtered_projects.is_empty() {
            let max = self.filtered_projects.len() - 1;
            self.selected_project = max;
            self.project_table_state.select(Some(max));
        }
    }

    pub fn apply_filter(&mut self) {
        let query = self.search_query.to_lowercase();
        self.filtered_projects = self
            .projects
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| query.is_empty() || name.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect();

        self.apply_sort();

        self.selected_project = 0;
        if !self.filtered_projects.is_empty() {
            self.project_table_state.select(Some(0));
        } else {
            self.project_table_state.select(None);
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let projects = &self.projects;
        let col = self.sort_column;
        self.filtered_projects.sort_by(|&a, &b| {
            let (na, pa) = &projects[a];
            let (nb, pb) = &projects[b];
            let cmp = match col {
                SortColumn::Name => na.to_lowercase().cmp(&nb.to_lowercase()),
                SortColumn::Sessions => pa.sessions.cmp(&pb.sessions),
                SortColumn::Messages => pa.messages.cmp(&pb.messages),
                SortColumn::Tokens => pa.tokens.total().cmp(&pb.tokens.total()),
                SortColumn::Time => pa
                    .duration_minutes
                    .partial_cmp(&pb.duration_minutes)
                    .unwrap_or(std::cmp::Ordering::Equal),
                SortColumn::Cost => pa.cost.partial_cmp(&pb.cost).unwrap_or(std::cmp::Ordering::Equal),
            };
            // Default descending except for name
            match col {
                SortColumn::Name => cmp,
                _ => cmp.reverse(),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceId;

    fn loaded_app() -> App {
        let (tx, rx) = mpsc::channel();
        let mut stats = Statistics::empty(SourceId::Pi);
        for (name, cost, sessions) in [("alpha", 1.0, 5), ("beta", 3.0, 1), ("gamma", 2.0, 2)] {
            stats.projects.insert(
                name.to_string(),
                ProjectStats {
                    sessions,
                    cost,
                    ..ProjectStats::default()
                },
            );
        }
        let info = SourceInfo {
            id: SourceId::Pi,
            label: "Pi Agent".to_string(),
        };
        let claude = (
            SourceInfo {
                id: SourceId::Claude,
                label: "Claude Code".to_string(),
            },
            Statistics::empty(SourceId::Claude),
        );
        tx.send(LoadMessage::Progress("reading".to_string())).unwrap();
        tx.send(LoadMessage::Done(vec![(info, stats), claude])).unwrap();

        let mut app = App::loading(rx);
        app.poll_load();
        app
    }

    fn names(app: &App) -> Vec<&str> {
        app.filtered_projects
            .iter()
            .map(|&i| app.projects[i].0.as_str())
            .collect()
    }

    #[test]
    fn test_poll_load_selects_first_source() {
        let app = loaded_app();
        assert!(!app.loading);
        assert_eq!(app.projects.len(), 3);
        assert_eq!(names(&app), vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn test_filter_and_sort() {
        let mut app = loaded_app();
        app.search_query = "a".to_string();
        app.apply_filter();
        assert_eq!(names(&app), vec!["beta", "gamma", "alpha"]);

        app.search_query = "alp".to_string();
        app.apply_filter();
        assert_eq!(names(&app), vec!["alpha"]);

        app.search_query.clear();
        app.apply_filter();
        app.cycle_sort(); // Cost -> Name
        assert_eq!(names(&app), vec!["alpha", "beta", "gamma"]);
        app.cycle_sort(); // Name -> Sessions
        assert_eq!(names(&app), vec!["alpha", "gamma", "beta"]);
    }

    #[test]
    fn test_next_source_swaps_projects() {
        let mut app = loaded_app();
        app.next_source();
        assert_eq!(app.current_stats().unwrap().source, SourceId::Claude);
        assert!(app.projects.is_empty());
        app.next_source();
        assert_eq!(app.current_stats().unwrap().source, SourceId::Pi);
    }

    #[test]
    fn test_failed_load_keeps_error() {
        let (tx, rx) = mpsc::channel();
        tx.send(LoadMessage::Failed("boom".to_string())).unwrap();
        let mut app = App::loading(rx);
        app.poll_load();
        assert!(!app.loading);
        assert_eq!(app.load_error.as_deref(), Some("boom"));
    }
}
