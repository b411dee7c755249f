//! Search box state machine
//!
//! Owns the input text, the debounce timer, the suggestion dropdown and the
//! current Selection. It performs no IO: callers feed it keystrokes, clock
//! ticks and resolver results, and act on the requests and selections it
//! hands back.

use crate::resolver::Candidate;
use crate::symbol::Symbol;
use crate::utils::debouncer::Debouncer;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Nothing typed
    Idle,
    /// Waiting for the debounce window or for the resolver
    Typing,
    /// Candidates received
    Suggesting,
    /// A candidate was chosen and the dashboard follows it
    Selected,
}

/// A search the caller should run; its token identifies the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: u64,
    pub query: String,
}

/// The ticker currently driving every display panel
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub symbol: Symbol,
    pub display_name: String,
}

pub struct SearchController {
    phase: SearchPhase,
    input: String,
    debouncer: Debouncer,
    /// Last token handed out
    issued: u64,
    /// Token whose response may still update the dropdown
    awaiting: Option<u64>,
    candidates: Vec<Candidate>,
    dropdown_visible: bool,
    highlighted: usize,
    selection: Option<Selection>,
}

impl SearchController {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            phase: SearchPhase::Idle,
            input: String::new(),
            debouncer: Debouncer::new(debounce_ms),
            issued: 0,
            awaiting: None,
            candidates: Vec::new(),
            dropdown_visible: false,
            highlighted: 0,
            selection: None,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_visible
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The text box changed
    pub fn on_input_changed(&mut self, text: &str, now: Instant) {
        if text == self.input && self.phase != SearchPhase::Idle {
            return;
        }
        self.input = text.to_string();

        if text.trim().is_empty() {
            self.reset_to_idle();
            return;
        }

        // Newer input supersedes whatever search is still in flight
        self.awaiting = None;
        self.phase = SearchPhase::Typing;
        self.debouncer.trigger(now);
    }

    /// Issue a search once the debounce window has elapsed
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchRequest> {
        if self.phase != SearchPhase::Typing || !self.debouncer.should_execute(now) {
            return None;
        }

        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.issued += 1;
        self.awaiting = Some(self.issued);
        debug!(target: "search", "Issuing search #{} for '{}'", self.issued, query);
        Some(SearchRequest {
            token: self.issued,
            query,
        })
    }

    /// Apply a resolver batch. Returns false when the batch is stale.
    pub fn on_results(&mut self, token: u64, candidates: Vec<Candidate>) -> bool {
        if self.awaiting != Some(token) {
            debug!(target: "search", "Discarding stale results #{} (awaiting {:?})", token, self.awaiting);
            return false;
        }

        self.awaiting = None;
        self.dropdown_visible = !candidates.is_empty();
        self.candidates = candidates;
        self.highlighted = 0;
        self.phase = SearchPhase::Suggesting;
        true
    }

    pub fn highlight_next(&mut self) {
        if !self.candidates.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.candidates.len();
        }
    }

    pub fn highlight_prev(&mut self) {
        if !self.candidates.is_empty() {
            self.highlighted = (self.highlighted + self.candidates.len() - 1) % self.candidates.len();
        }
    }

    /// Choose candidate `index`; returns the Selection the caller must act on
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        if !self.dropdown_visible {
            return None;
        }
        let candidate = self.candidates.get(index)?.clone();

        let selection = Selection {
            symbol: candidate.symbol,
            display_name: candidate.display_name,
        };
        info!(target: "search", "Selected {} ({})", selection.display_name, selection.symbol);

        self.input = selection.display_name.clone();
        self.enter_selected(selection.clone());
        Some(selection)
    }

    pub fn select_highlighted(&mut self) -> Option<Selection> {
        self.select(self.highlighted)
    }

    /// Restore a Selection from a share link or the last session; no dropdown
    pub fn restore(&mut self, symbol: Symbol, display_name: Option<String>) -> Selection {
        let selection = Selection {
            display_name: display_name.unwrap_or_else(|| symbol.to_string()),
            symbol,
        };
        info!(target: "search", "Restored selection {}", selection.symbol);
        self.input = selection.display_name.clone();
        self.enter_selected(selection.clone());
        selection
    }

    /// A pointer event landed outside the dropdown
    pub fn on_pointer_outside(&mut self) {
        self.dropdown_visible = false;
    }

    /// Show the last batch again, e.g. when focus returns to the box
    pub fn reopen_dropdown(&mut self) {
        if self.phase == SearchPhase::Suggesting && !self.candidates.is_empty() {
            self.dropdown_visible = true;
        }
    }

    /// Clear the input box
    pub fn clear(&mut self) {
        self.input.clear();
        self.reset_to_idle();
    }

    fn enter_selected(&mut self, selection: Selection) {
        self.selection = Some(selection);
        self.phase = SearchPhase::Selected;
        self.candidates.clear();
        self.dropdown_visible = false;
        self.highlighted = 0;
        self.awaiting = None;
        self.debouncer.reset();
    }

    fn reset_to_idle(&mut self) {
        self.phase = SearchPhase::Idle;
        self.candidates.clear();
        self.dropdown_visible = false;
        self.highlighted = 0;
        self.awaiting = None;
        self.debouncer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Price;
    use std::time::Duration;

    fn candidate(name: &str, symbol: &str) -> Candidate {
        Candidate {
            display_name: name.to_string(),
            symbol: Symbol::parse(symbol).unwrap(),
            price: Price::Unavailable,
        }
    }

    #[test]
    fn test_typing_then_debounce_issues_request() {
        let start = Instant::now();
        let mut controller = SearchController::new(300);
        controller.on_input_changed("TC", start);
        assert_eq!(controller.phase(), SearchPhase::Typing);
        assert!(controller.poll_debounce(start + Duration::from_millis(100)).is_none());

        controller.on_input_changed("TCS ", start + Duration::from_millis(200));
        let request = controller
            .poll_debounce(start + Duration::from_millis(500))
            .unwrap();
        assert_eq!(request.query, "TCS");
        assert_eq!(request.token, 1);
    }

    #[test]
    fn test_whitespace_input_goes_idle_without_request() {
        let start = Instant::now();
        let mut controller = SearchController::new(0);
        controller.on_input_changed("   ", start);
        assert_eq!(controller.phase(), SearchPhase::Idle);
        assert!(controller.poll_debounce(start).is_none());
    }

    #[test]
    fn test_empty_batch_keeps_dropdown_hidden() {
        let start = Instant::now();
        let mut controller = SearchController::new(0);
        controller.on_input_changed("zzzz", start);
        let request = controller.poll_debounce(start).unwrap();
        assert!(controller.on_results(request.token, Vec::new()));
        assert_eq!(controller.phase(), SearchPhase::Suggesting);
        assert!(!controller.dropdown_visible());
    }

    #[test]
    fn test_clear_discards_in_flight() {
        let start = Instant::now();
        let mut controller = SearchController::new(0);
        controller.on_input_changed("INF", start);
        let request = controller.poll_debounce(start).unwrap();
        controller.clear();
        assert!(!controller.on_results(request.token, vec![candidate("Infosys", "INFY.NS")]));
        assert_eq!(controller.phase(), SearchPhase::Idle);
        assert!(controller.candidates().is_empty());
    }

    #[test]
    fn test_highlight_wraps_and_selects() {
        let start = Instant::now();
        let mut controller = SearchController::new(0);
        controller.on_input_changed("TATA", start);
        let request = controller.poll_debounce(start).unwrap();
        controller.on_results(
            request.token,
            vec![candidate("Tata Motors", "TATAMOTORS.NS"), candidate("Tata Steel", "TATASTEEL.NS")],
        );

        controller.highlight_prev();
        assert_eq!(controller.highlighted(), 1);
        let selection = controller.select_highlighted().unwrap();
        assert_eq!(selection.symbol.as_str(), "TATASTEEL.NS");
        assert_eq!(controller.input(), "Tata Steel");
        assert_eq!(controller.phase(), SearchPhase::Selected);
        assert!(controller.select(0).is_none());
    }

    #[test]
    fn test_pointer_outside_hides_and_reopen_restores() {
        let start = Instant::now();
        let mut controller = SearchController::new(0);
        controller.on_input_changed("ITC", start);
        let request = controller.poll_debounce(start).unwrap();
        controller.on_results(request.token, vec![candidate("ITC", "ITC.NS")]);

        controller.on_pointer_outside();
        assert!(!controller.dropdown_visible());
        assert!(controller.select(0).is_none());

        controller.reopen_dropdown();
        assert!(controller.dropdown_visible());
    }
}
