//! Range Expander: descriptor tokens ("AA", "AKs", "T9o", "ATs+", "KXs")
//! to concrete two-card combos, plus the bucket utilities on [`PokerRange`].
//!
//! Grammar of a single token (surrounding whitespace ignored):
//!
//! | Token   | Meaning                                        | Combos |
//! |---------|------------------------------------------------|--------|
//! | `QQ`    | one pocket pair                                | 6      |
//! | `AKs`   | suited, either rank order accepted             | 4      |
//! | `AKo`   | offsuit                                        | 12     |
//! | `AK`    | suited and offsuit                             | 16     |
//! | `TT+`   | the pair and every higher pair                 | 6 each |
//! | `ATs+`  | kicker climbs up to one below the top card     | 4 each |
//! | `AXs`   | `X` stands for every other rank                | 4 each |
//! | `XX`    | every starting hand (`XXs`, `XXo` narrow it)   | 1326   |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::equity_engine::{
    error::{EngineError, Result},
    models::{
        Card, Combo, PokerRange, Rank, RangeAction, RangeBreakdown, RangeStats, RangeValidation,
        Suit,
    },
};

/// Raise buckets above this many descriptors are flagged by [`PokerRange::validate`].
const LARGE_RAISE_BUCKET: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    Pair,
    Suited,
    Offsuit,
}

/// One of the 169 starting-hand classes, e.g. `AKs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandClass {
    high: Rank,
    low: Rank,
    shape: Shape,
}

impl HandClass {
    pub fn pair(rank: Rank) -> Self {
        HandClass { high: rank, low: rank, shape: Shape::Pair }
    }

    /// Suited or offsuit class; rank order does not matter. Equal ranks
    /// always give the pair.
    pub fn unpaired(a: Rank, b: Rank, suited: bool) -> Self {
        if a == b {
            return HandClass::pair(a);
        }
        let (high, low) = if a > b { (a, b) } else { (b, a) };
        let shape = if suited { Shape::Suited } else { Shape::Offsuit };
        HandClass { high, low, shape }
    }

    /// The class a concrete combo belongs to.
    pub fn of(combo: &Combo) -> Self {
        let (h, l) = (combo.high(), combo.low());
        HandClass::unpaired(h.rank, l.rank, h.suit == l.suit)
    }

    pub fn high(&self) -> Rank {
        self.high
    }

    pub fn low(&self) -> Rank {
        self.low
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn num_combos(&self) -> usize {
        match self.shape {
            Shape::Pair    => 6,
            Shape::Suited  => 4,
            Shape::Offsuit => 12,
        }
    }

    pub fn combos(&self) -> Vec<Combo> {
        let mut out = Vec::with_capacity(self.num_combos());
        for (i, &s1) in Suit::ALL.iter().enumerate() {
            for (j, &s2) in Suit::ALL.iter().enumerate() {
                let keep = match self.shape {
                    Shape::Pair    => i < j,
                    Shape::Suited  => i == j,
                    Shape::Offsuit => i != j,
                };
                if keep {
                    let hand = Combo::new(Card::new(self.high, s1), Card::new(self.low, s2));
                    out.extend(hand.ok());
                }
            }
        }
        out
    }
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Pair    => write!(f, "{}{}", self.high, self.low),
            Shape::Suited  => write!(f, "{}{}s", self.high, self.low),
            Shape::Offsuit => write!(f, "{}{}o", self.high, self.low),
        }
    }
}

impl FromStr for HandClass {
    type Err = EngineError;

    /// Exactly one class: "QQ", "AKs" or "AKo".
    fn from_str(s: &str) -> Result<Self> {
        match expand_descriptor(s)?.as_slice() {
            [class] => Ok(*class),
            _ => Err(EngineError::InvalidDescriptor(s.to_string())),
        }
    }
}

/// The 13x13 starting-hand grid, row-major from the aces: pairs on the
/// diagonal, suited hands above it, offsuit below.
pub fn hand_matrix() -> Vec<HandClass> {
    let ranks: Vec<Rank> = Rank::descending().collect();
    let mut grid = Vec::with_capacity(169);
    for (i, &row) in ranks.iter().enumerate() {
        for (j, &col) in ranks.iter().enumerate() {
            grid.push(if i == j {
                HandClass::pair(row)
            } else {
                HandClass::unpaired(row, col, i < j)
            });
        }
    }
    grid
}

/// Rank or `X` wildcard.
fn rank_slot(c: char) -> Option<Option<Rank>> {
    match c {
        'X' | 'x' => Some(None),
        _ => Rank::from_symbol(c).map(Some),
    }
}

fn shapes(suited: Option<bool>) -> &'static [bool] {
    match suited {
        Some(true)  => &[true],
        Some(false) => &[false],
        None        => &[true, false],
    }
}

/// Expand one descriptor token into the hand classes it names.
pub fn expand_descriptor(token: &str) -> Result<Vec<HandClass>> {
    let invalid = || EngineError::InvalidDescriptor(token.to_string());
    let chars: Vec<char> = token.trim().chars().collect();
    let (plus, body) = match chars.split_last() {
        Some((&'+', rest)) => (true, rest),
        _ => (false, chars.as_slice()),
    };
    let (a, b, suited) = match body {
        [a, b]      => (*a, *b, None),
        [a, b, 's'] => (*a, *b, Some(true)),
        [a, b, 'o'] => (*a, *b, Some(false)),
        _ => return Err(invalid()),
    };
    let first = rank_slot(a).ok_or_else(invalid)?;
    let second = rank_slot(b).ok_or_else(invalid)?;

    let classes = match (first, second) {
        (Some(r1), Some(r2)) if r1 == r2 => {
            if suited.is_some() {
                return Err(invalid());
            }
            let top = if plus { Rank::ACE.0 } else { r1.0 };
            (r1.0..=top).map(|r| HandClass::pair(Rank(r))).collect()
        }
        (Some(r1), Some(r2)) => {
            let (high, low) = if r1 > r2 { (r1, r2) } else { (r2, r1) };
            let top = if plus { high.0 - 1 } else { low.0 };
            (low.0..=top)
                .flat_map(|k| shapes(suited).iter().map(move |&s| HandClass::unpaired(high, Rank(k), s)))
                .collect()
        }
        (Some(fixed), None) | (None, Some(fixed)) => {
            if plus {
                return Err(invalid());
            }
            Rank::descending()
                .filter(|&r| r != fixed)
                .flat_map(|r| shapes(suited).iter().map(move |&s| HandClass::unpaired(fixed, r, s)))
                .collect()
        }
        (None, None) => {
            if plus {
                return Err(invalid());
            }
            hand_matrix()
                .into_iter()
                .filter(|c| match (suited, c.shape) {
                    (None, _) => true,
                    (Some(true), shape) => shape == Shape::Suited,
                    (Some(false), shape) => shape == Shape::Offsuit,
                })
                .collect()
        }
    };
    Ok(classes)
}

/// Split a comma-separated descriptor list into trimmed, non-empty tokens.
pub fn parse_descriptor_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every concrete combo named by `descriptors`, de-duplicated. Each entry may
/// itself be a comma-separated list.
pub fn descriptor_to_combos<S: AsRef<str>>(descriptors: &[S]) -> Result<BTreeSet<Combo>> {
    let mut combos = BTreeSet::new();
    for entry in descriptors {
        for token in parse_descriptor_list(entry.as_ref()) {
            for class in expand_descriptor(&token)? {
                combos.extend(class.combos());
            }
        }
    }
    Ok(combos)
}

/// Class notation of a concrete combo, e.g. `Ks Ah` gives "AKo".
pub fn combo_to_descriptor(combo: &Combo) -> String {
    HandClass::of(combo).to_string()
}

/// Drop combos sharing a card with `known` (hero cards, board).
pub fn remove_conflicts<I>(combos: I, known: &[Card]) -> Vec<Combo>
where
    I: IntoIterator<Item = Combo>,
{
    combos.into_iter().filter(|c| !c.collides_with(known)).collect()
}

impl PokerRange {
    /// Combos from every bucket, including fold.
    pub fn combos(&self) -> Result<BTreeSet<Combo>> {
        self.combos_by_actions(&RangeAction::ALL)
    }

    pub fn combos_by_action(&self, action: RangeAction) -> Result<BTreeSet<Combo>> {
        descriptor_to_combos(self.bucket(action))
    }

    pub fn combos_by_actions(&self, actions: &[RangeAction]) -> Result<BTreeSet<Combo>> {
        let mut all = BTreeSet::new();
        for &action in actions {
            all.extend(self.combos_by_action(action)?);
        }
        Ok(all)
    }

    /// Raise and call buckets.
    pub fn aggressive_combos(&self) -> Result<BTreeSet<Combo>> {
        self.combos_by_actions(&[RangeAction::Raise, RangeAction::Call])
    }

    /// Call and fold buckets.
    pub fn passive_combos(&self) -> Result<BTreeSet<Combo>> {
        self.combos_by_actions(&[RangeAction::Call, RangeAction::Fold])
    }

    /// Raise bucket only.
    pub fn value_combos(&self) -> Result<BTreeSet<Combo>> {
        self.combos_by_action(RangeAction::Raise)
    }

    /// Combos for each action in `include`, plus which actions were left out.
    pub fn breakdown(&self, include: &[RangeAction]) -> Result<RangeBreakdown> {
        let mut by_action = BTreeMap::new();
        let mut included_actions = Vec::new();
        for &action in include {
            if by_action.contains_key(&action) {
                continue;
            }
            by_action.insert(action, self.combos_by_action(action)?);
            included_actions.push(action);
        }
        let excluded_actions = RangeAction::ALL
            .into_iter()
            .filter(|a| !by_action.contains_key(a))
            .collect();
        Ok(RangeBreakdown {
            total_combos: by_action.values().map(BTreeSet::len).sum(),
            by_action,
            included_actions,
            excluded_actions,
        })
    }

    /// Descriptor token to action, as listed in the buckets. A token listed
    /// in several buckets keeps the last one (fold, then call, then raise).
    pub fn action_by_descriptor(&self) -> BTreeMap<String, RangeAction> {
        let mut grid = BTreeMap::new();
        for action in RangeAction::ALL {
            for token in self.bucket(action) {
                grid.insert(token.clone(), action);
            }
        }
        grid
    }

    pub fn stats(&self) -> Result<RangeStats> {
        let mut combos_by_action = BTreeMap::new();
        let mut hands_by_action = BTreeMap::new();
        for action in RangeAction::ALL {
            combos_by_action.insert(action, self.combos_by_action(action)?.len());
            hands_by_action.insert(action, self.bucket(action).len());
        }
        Ok(RangeStats {
            total_combos: self.combos()?.len(),
            total_hands: self.hand_count(),
            combos_by_action,
            hands_by_action,
        })
    }

    /// Every distinct token across the buckets, joined with ", ".
    pub fn descriptor(&self) -> String {
        let mut seen = BTreeSet::new();
        RangeAction::ALL
            .iter()
            .flat_map(|&a| self.bucket(a).iter())
            .map(|t| t.trim())
            .filter(|t| seen.insert(t.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn validate(&self) -> RangeValidation {
        let mut report = RangeValidation::default();
        if self.hand_count() == 0 {
            report.errors.push("Range has no actions defined".into());
        }

        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        let mut invalid = Vec::new();
        for action in RangeAction::ALL {
            for token in self.bucket(action) {
                let token = token.trim();
                if !seen.insert(token) {
                    if !duplicates.contains(&token) {
                        duplicates.push(token);
                    }
                } else if expand_descriptor(token).is_err() {
                    invalid.push(token);
                }
            }
        }
        if !duplicates.is_empty() {
            report.errors.push(format!("Duplicate hands found: {}", duplicates.join(", ")));
        }
        if !invalid.is_empty() {
            report.errors.push(format!("Invalid hand formats: {}", invalid.join(", ")));
        }
        if self.raise.len() > LARGE_RAISE_BUCKET {
            report
                .warnings
                .push(format!("Large raise range detected (>{LARGE_RAISE_BUCKET} hands)"));
        }
        report
    }

    /// Hand classes named by a bucket. Malformed tokens are skipped here;
    /// [`PokerRange::validate`] reports them.
    fn classes(&self, action: RangeAction) -> BTreeSet<HandClass> {
        self.bucket(action)
            .iter()
            .filter_map(|t| expand_descriptor(t).ok())
            .flatten()
            .collect()
    }

    /// Raise wins over call; anything in neither bucket folds.
    pub fn action_for(&self, hand: &HandClass) -> RangeAction {
        if self.classes(RangeAction::Raise).contains(hand) {
            RangeAction::Raise
        } else if self.classes(RangeAction::Call).contains(hand) {
            RangeAction::Call
        } else {
            RangeAction::Fold
        }
    }

    /// Classes played with `action`, in grid order. Fold is every class not
    /// raised or called, whatever the fold bucket lists.
    pub fn hands_by_action(&self, action: RangeAction) -> Vec<HandClass> {
        let raise = self.classes(RangeAction::Raise);
        let call = self.classes(RangeAction::Call);
        hand_matrix()
            .into_iter()
            .filter(|c| match action {
                RangeAction::Raise => raise.contains(c),
                RangeAction::Call  => call.contains(c),
                RangeAction::Fold  => !raise.contains(c) && !call.contains(c),
            })
            .collect()
    }
}
