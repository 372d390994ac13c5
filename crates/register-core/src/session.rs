//! # Session State Machine
//!
//! One customer interaction, modelled as a value.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Event           From       To         Guard          Effects          │
//! │  ─────────────   ────────   ────────   ────────────   ───────────────  │
//! │  Start           Idle       Scanning   -              InitializeAudio  │
//! │  Scan(code)      Scanning   Scanning   code not empty PlayTone,        │
//! │                                                       After(300ms,     │
//! │                                                         Speak(price))  │
//! │  RequestPayment  Scanning   Payment    items > 0      Speak(total)     │
//! │  Reset           Payment    Scanning   -              Speak(next)      │
//! │                                                                         │
//! │  Anything else: session returned unchanged, no effects,               │
//! │                 Outcome::Ignored(reason)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Session::apply` consumes the session and hands back the next one along
//! with a list of [`Effect`]s. It never performs them: playing the tone,
//! waiting before speech and talking to the speaker are the engine's job.
//! That keeps every rule here testable with plain `assert_eq!`.

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::Money;
use crate::rules::RegisterRules;
use crate::types::{LineItem, RegisterState, SessionSnapshot};
use crate::validation::validate_scan_code;

// =============================================================================
// Events
// =============================================================================

/// A decoded barcode as it entered the engine.
///
/// Identity and time are fixed on receipt, so replaying the same
/// `ScanEvent` against the same session always yields the same line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// Id the resulting line item will carry.
    pub id: String,
    /// Raw decoded string.
    pub code: String,
    /// When the engine received the code.
    pub received_at: DateTime<Utc>,
}

impl ScanEvent {
    /// Stamps a freshly decoded code with a new UUID and the current time.
    pub fn new(code: impl Into<String>) -> Self {
        ScanEvent {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            received_at: Utc::now(),
        }
    }

    /// Builds a scan with a known identity (replays, tests).
    pub fn with_identity(
        code: impl Into<String>,
        id: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        ScanEvent {
            id: id.into(),
            code: code.into(),
            received_at,
        }
    }
}

/// Everything that can happen to a session.
///
/// User intents and scanner output share this one type so the engine can
/// serialize them through a single inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// "Start the register" button.
    Start,
    /// A code arrived from the scan source.
    Scan(ScanEvent),
    /// "Pay" button.
    RequestPayment,
    /// "Next customer" button.
    Reset,
}

impl Event {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Scan(_) => "scan",
            Event::RequestPayment => "request_payment",
            Event::Reset => "reset",
        }
    }
}

// =============================================================================
// Effects
// =============================================================================

/// A side effect requested by a transition.
///
/// Effects are descriptions only. Audio effects are fire-and-forget: nothing
/// in the state machine waits for them or looks at their result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Unlock/prepare audio output. Must run while handling the start
    /// gesture itself, not later.
    InitializeAudio,
    /// Short confirmation beep.
    PlayTone,
    /// Say something.
    Speak(String),
    /// Perform `effect` once `delay` has elapsed, without holding up
    /// further events.
    After { delay: Duration, effect: Box<Effect> },
}

impl Effect {
    /// Convenience constructor for a deferred effect.
    pub fn after(delay: Duration, effect: Effect) -> Self {
        Effect::After {
            delay,
            effect: Box::new(effect),
        }
    }
}

// =============================================================================
// Transition Result
// =============================================================================

/// Whether the event changed anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A guard failed; the session is exactly what it was before.
    Ignored(CoreError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// The result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(session: Session, effects: Vec<Effect>) -> Self {
        Transition {
            session,
            effects,
            outcome: Outcome::Applied,
        }
    }

    fn ignored(session: Session, reason: CoreError) -> Self {
        Transition {
            session,
            effects: Vec::new(),
            outcome: Outcome::Ignored(reason),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The register's whole mutable context.
///
/// ## Invariants
/// - `items` only grows while scanning and is emptied on reset
/// - Totals are computed from `items` on every read, never cached
/// - `last_scanned` is `None` on entering scanning and after reset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    state: RegisterState,
    items: Vec<LineItem>,
    last_scanned: Option<String>,
}

impl Session {
    /// A fresh session on the start screen.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RegisterState {
        self.state
    }

    /// Items in scan order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Code of the most recent scan, for the "just scanned" panel.
    pub fn last_scanned(&self) -> Option<&str> {
        self.last_scanned.as_deref()
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_amount(&self) -> Money {
        self.items.iter().map(|item| item.price).sum()
    }

    /// The pay guard, exposed so the presentation layer can disable the
    /// button with the same rule the state machine enforces.
    pub fn can_pay(&self) -> bool {
        self.state == RegisterState::Scanning && !self.items.is_empty()
    }

    /// Builds the read model handed to the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            items: self.items.clone(),
            total_count: self.total_count(),
            total_amount: self.total_amount(),
            last_scanned: self.last_scanned.clone(),
            can_pay: self.can_pay(),
        }
    }

    /// Applies one event and returns the next session plus the effects to
    /// perform.
    ///
    /// ## Example
    /// ```rust
    /// use register_core::{Effect, Event, Outcome, RegisterRules, Session};
    ///
    /// let rules = RegisterRules::default();
    /// let t = Session::new().apply(Event::Start, &rules);
    ///
    /// assert_eq!(t.outcome, Outcome::Applied);
    /// assert_eq!(t.effects, vec![Effect::InitializeAudio]);
    ///
    /// // Paying for nothing is refused and changes nothing.
    /// let before = t.session.clone();
    /// let t = t.session.apply(Event::RequestPayment, &rules);
    /// assert!(!t.outcome.is_applied());
    /// assert_eq!(t.session, before);
    /// ```
    pub fn apply(mut self, event: Event, rules: &RegisterRules) -> Transition {
        match (self.state, event) {
            (RegisterState::Idle, Event::Start) => {
                self.state = RegisterState::Scanning;
                self.last_scanned = None;
                Transition::applied(self, vec![Effect::InitializeAudio])
            }

            (RegisterState::Scanning, Event::Scan(scan)) => {
                if let Err(e) = validate_scan_code(&scan.code) {
                    return Transition::ignored(self, e.into());
                }

                self.last_scanned = Some(scan.code.clone());
                self.items.push(LineItem {
                    id: scan.id,
                    code: scan.code,
                    name: rules.item_name.clone(),
                    price: rules.unit_price,
                    timestamp: scan.received_at,
                });

                let effects = vec![
                    Effect::PlayTone,
                    Effect::after(
                        rules.speech_delay,
                        Effect::Speak(rules.phrases.price_confirmation(rules.unit_price)),
                    ),
                ];
                Transition::applied(self, effects)
            }

            (RegisterState::Scanning, Event::RequestPayment) => {
                if self.items.is_empty() {
                    return Transition::ignored(self, CoreError::EmptyCart);
                }

                self.state = RegisterState::Payment;
                let announcement = rules.phrases.total_announcement(self.total_amount());
                Transition::applied(self, vec![Effect::Speak(announcement)])
            }

            (RegisterState::Payment, Event::Reset) => {
                self.items.clear();
                self.last_scanned = None;
                self.state = RegisterState::Scanning;
                Transition::applied(
                    self,
                    vec![Effect::Speak(rules.phrases.next_customer.clone())],
                )
            }

            (state, event) => Transition::ignored(
                self,
                CoreError::InvalidTransition {
                    event: event.name(),
                    state,
                },
            ),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::rules::Phrases;

    fn rules() -> RegisterRules {
        RegisterRules::default()
    }

    /// Applies events in order, asserting nothing about outcomes.
    fn run(session: Session, events: Vec<Event>) -> Session {
        let rules = rules();
        events
            .into_iter()
            .fold(session, |s, e| s.apply(e, &rules).session)
    }

    fn scan(code: &str) -> Event {
        Event::Scan(ScanEvent::new(code))
    }

    fn scanning_with(codes: &[&str]) -> Session {
        let mut events = vec![Event::Start];
        events.extend(codes.iter().map(|c| scan(c)));
        run(Session::new(), events)
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.state(), RegisterState::Idle);
        assert_eq!(session.total_count(), 0);
        assert!(session.total_amount().is_zero());
        assert!(session.last_scanned().is_none());
        assert!(!session.can_pay());
    }

    #[test]
    fn test_start_enters_scanning_and_initializes_audio() {
        let t = Session::new().apply(Event::Start, &rules());

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.state(), RegisterState::Scanning);
        assert_eq!(t.effects, vec![Effect::InitializeAudio]);
    }

    #[test]
    fn test_start_outside_idle_is_ignored() {
        let scanning = scanning_with(&["A1"]);
        let t = scanning.clone().apply(Event::Start, &rules());
        assert_eq!(t.session, scanning);
        assert!(t.effects.is_empty());
        assert_eq!(
            t.outcome,
            Outcome::Ignored(CoreError::InvalidTransition {
                event: "start",
                state: RegisterState::Scanning,
            })
        );

        let paying = run(scanning, vec![Event::RequestPayment]);
        let t = paying.clone().apply(Event::Start, &rules());
        assert_eq!(t.session, paying);
        assert!(!t.outcome.is_applied());
    }

    #[test]
    fn test_scan_rings_up_item_with_tone_then_delayed_price() {
        let rules = rules();
        let received_at = Utc::now();
        let event = Event::Scan(ScanEvent::with_identity("4901234567894", "item-1", received_at));

        let started = run(Session::new(), vec![Event::Start]);
        let t = started.apply(event, &rules);

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(
            t.session.items(),
            &[LineItem {
                id: "item-1".to_string(),
                code: "4901234567894".to_string(),
                name: "100円ショップの商品".to_string(),
                price: Money::from_yen(110),
                timestamp: received_at,
            }]
        );
        assert_eq!(t.session.last_scanned(), Some("4901234567894"));
        assert_eq!(
            t.effects,
            vec![
                Effect::PlayTone,
                Effect::after(
                    Duration::from_millis(300),
                    Effect::Speak("ひゃくじゅうえん".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_scan_outside_scanning_is_ignored() {
        let idle = Session::new();
        let t = idle.clone().apply(scan("A1"), &rules());
        assert_eq!(t.session, idle);
        assert!(t.effects.is_empty());

        let paying = run(scanning_with(&["A1"]), vec![Event::RequestPayment]);
        let t = paying.clone().apply(scan("A2"), &rules());
        assert_eq!(t.session, paying);
        assert_eq!(t.session.total_count(), 1);
    }

    #[test]
    fn test_gs1_code_with_group_separator_rings_up() {
        let gs1 = "0104912345678904\u{1d}10ABC123";
        let t = scanning_with(&[]).apply(scan(gs1), &rules());

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.total_count(), 1);
        assert_eq!(t.session.items()[0].code, gs1);
        assert_eq!(t.session.last_scanned(), Some(gs1));
    }

    #[test]
    fn test_whitespace_code_rings_up_verbatim() {
        let t = scanning_with(&[]).apply(scan("  "), &rules());

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.items()[0].code, "  ");
    }

    #[test]
    fn test_empty_scan_is_ignored() {
        let session = scanning_with(&[]);
        let t = session.clone().apply(scan(""), &rules());

        assert_eq!(t.session, session);
        assert!(t.effects.is_empty());
        assert_eq!(
            t.outcome,
            Outcome::Ignored(CoreError::Validation(ValidationError::Required {
                field: "code".to_string()
            }))
        );
    }

    #[test]
    fn test_totals_follow_scan_count() {
        let price = rules().unit_price;
        for n in 0..12 {
            let codes: Vec<String> = (0..n).map(|i| format!("code-{}", i % 3)).collect();
            let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
            let session = scanning_with(&refs);

            assert_eq!(session.total_count(), n);
            assert_eq!(session.total_amount(), Money::from_yen(price.yen() * n as i64));
        }
    }

    #[test]
    fn test_repeated_codes_are_independent_items() {
        // start → A1 → A2 → A1
        let session = scanning_with(&["A1", "A2", "A1"]);

        assert_eq!(session.total_count(), 3);
        assert_eq!(session.total_amount().yen(), 330);

        let codes: Vec<&str> = session.items().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "A2", "A1"]);

        let ids: std::collections::HashSet<&str> =
            session.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(session.last_scanned(), Some("A1"));
    }

    #[test]
    fn test_payment_requires_items() {
        let session = scanning_with(&[]);
        let t = session.clone().apply(Event::RequestPayment, &rules());

        assert_eq!(t.session.state(), RegisterState::Scanning);
        assert_eq!(t.session, session);
        assert!(t.effects.is_empty());
        assert_eq!(t.outcome, Outcome::Ignored(CoreError::EmptyCart));
    }

    #[test]
    fn test_payment_announces_total_and_keeps_cart() {
        let session = scanning_with(&["A1", "A2", "A3"]);
        let items_before = session.items().to_vec();

        let t = session.apply(Event::RequestPayment, &rules());

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.state(), RegisterState::Payment);
        assert_eq!(t.session.items(), items_before.as_slice());
        assert_eq!(
            t.effects,
            vec![Effect::Speak("ごうけい、330えんです。".to_string())]
        );
        assert!(!t.session.can_pay());
    }

    #[test]
    fn test_payment_outside_scanning_is_ignored() {
        let t = Session::new().apply(Event::RequestPayment, &rules());
        assert_eq!(t.session.state(), RegisterState::Idle);

        let paying = run(scanning_with(&["A1"]), vec![Event::RequestPayment]);
        let t = paying.clone().apply(Event::RequestPayment, &rules());
        assert_eq!(t.session, paying);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_reset_clears_cart_and_invites_next_customer() {
        // start → scan ×2 → pay → reset
        let paying = run(scanning_with(&["A1", "A2"]), vec![Event::RequestPayment]);
        let t = paying.apply(Event::Reset, &rules());

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.state(), RegisterState::Scanning);
        assert_eq!(t.session.total_count(), 0);
        assert!(t.session.total_amount().is_zero());
        assert!(t.session.last_scanned().is_none());
        assert_eq!(t.effects, vec![Effect::Speak("つぎの、どうぞ！".to_string())]);
    }

    #[test]
    fn test_reset_from_any_cart_size_yields_zero() {
        for n in 1..6 {
            let codes: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
            let session = run(scanning_with(&refs), vec![Event::RequestPayment, Event::Reset]);

            assert_eq!(session.total_count(), 0);
            assert_eq!(session.total_amount(), Money::zero());
        }
    }

    #[test]
    fn test_reset_outside_payment_is_ignored() {
        let idle = Session::new();
        assert_eq!(idle.clone().apply(Event::Reset, &rules()).session, idle);

        let scanning = scanning_with(&["A1"]);
        let t = scanning.clone().apply(Event::Reset, &rules());
        assert_eq!(t.session, scanning);
        assert_eq!(t.session.total_count(), 1);
        assert!(!t.outcome.is_applied());
    }

    #[test]
    fn test_session_serves_several_customers() {
        let session = run(
            scanning_with(&["A1"]),
            vec![
                Event::RequestPayment,
                Event::Reset,
                scan("B1"),
                scan("B2"),
                Event::RequestPayment,
            ],
        );

        assert_eq!(session.state(), RegisterState::Payment);
        assert_eq!(session.total_count(), 2);
        assert_eq!(session.total_amount().yen(), 220);
    }

    #[test]
    fn test_custom_rules_flow_into_items_and_speech() {
        let mut rules = RegisterRules::default();
        rules.unit_price = Money::from_yen(50);
        rules.item_name = "おかし".to_string();

        let session = Session::new().apply(Event::Start, &rules).session;
        let session = session.apply(scan("X"), &rules).session;
        let t = session.apply(Event::RequestPayment, &rules);

        assert_eq!(t.session.items()[0].name, "おかし");
        assert_eq!(t.session.total_amount().yen(), 50);
        assert_eq!(t.effects, vec![Effect::Speak("ごうけい、50えんです。".to_string())]);
    }

    #[test]
    fn test_custom_price_is_spoken_after_each_scan() {
        let mut rules = RegisterRules::default();
        rules.unit_price = Money::from_yen(100);
        rules.phrases.unit_price = Phrases::unit_price_phrase_for(rules.unit_price);

        let session = Session::new().apply(Event::Start, &rules).session;
        let t = session.apply(scan("X"), &rules);

        assert_eq!(
            t.effects[1],
            Effect::after(Duration::from_millis(300), Effect::Speak("100えん".to_string()))
        );
    }

    #[test]
    fn test_huge_prices_do_not_overflow_total() {
        let mut rules = RegisterRules::default();
        rules.unit_price = Money::from_yen(i64::MAX / 2 + 1);

        let session = Session::new().apply(Event::Start, &rules).session;
        let session = session.apply(scan("A1"), &rules).session;
        let t = session.apply(scan("A2"), &rules);

        assert_eq!(t.outcome, Outcome::Applied);
        assert_eq!(t.session.total_count(), 2);
        assert_eq!(t.session.total_amount().yen(), i64::MAX);
    }

    #[test]
    fn test_snapshot_mirrors_session() {
        let session = scanning_with(&["A1", "A2"]);
        let snapshot = session.snapshot();

        assert_eq!(snapshot.state, RegisterState::Scanning);
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.total_amount.yen(), 220);
        assert_eq!(snapshot.last_scanned.as_deref(), Some("A2"));
        assert_eq!(snapshot.items, session.items());
        assert!(snapshot.can_pay);
    }
}
