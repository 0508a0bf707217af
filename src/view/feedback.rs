//! Feedback page state

use crate::feedback::{filter_and_sort, Feedback, FeedbackSort};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackUiState {
    pub selected_feedback_id: Option<String>,
    /// Free-text search over name, email and message
    pub filter: String,
    pub sort: FeedbackSort,
}

impl FeedbackUiState {
    pub fn set_selected_feedback(&mut self, id: Option<&str>) {
        self.selected_feedback_id = id.map(str::to_string);
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    pub fn set_sort(&mut self, sort: FeedbackSort) {
        self.sort = sort;
    }

    pub fn clear_selection(&mut self) {
        self.selected_feedback_id = None;
    }

    /// Rows to render for `items`
    pub fn visible<'a>(&self, items: &'a [Feedback]) -> Vec<&'a Feedback> {
        filter_and_sort(items, &self.filter, self.sort)
    }

    pub fn selected<'a>(&self, items: &'a [Feedback]) -> Option<&'a Feedback> {
        let id = self.selected_feedback_id.as_deref()?;
        items.iter().find(|item| item.id == id)
    }
}
