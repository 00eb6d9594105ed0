//! Text model definition (`mdef`) parser.
//!
//! ```text
//! 0.3
//! 3 n_base
//! 1 n_tri
//! 16 n_state_map
//! 9 n_tied_state
//! 9 n_tied_ci_state
//! 3 n_tied_tmat
//! #
//! # base lft rt p attrib tmat ... state id's ...
//! SIL   -   -  - filler  0    0 1 2 N
//! AE    -   -  - n/a     1    3 4 5 N
//! T     -   -  - n/a     2    6 7 8 N
//! AE    T   T  i n/a     1    3 4 5 N
//! ```

use crate::error::LoadError;
use crate::hmm::HmmPosition;

/// One HMM row of a model definition.
#[derive(Clone, Debug, PartialEq)]
pub struct MdefEntry {
    /// 1-based source line
    pub line: usize,
    pub base: String,
    /// Left neighbor phone, `None` for context-independent rows
    pub left: Option<String>,
    /// Right neighbor phone, `None` for context-independent rows
    pub right: Option<String>,
    pub position: HmmPosition,
    pub filler: bool,
    /// Transition matrix id
    pub tmat: usize,
    /// Tied senone ids, one per emitting state
    pub states: Vec<usize>,
}

impl MdefEntry {
    pub fn is_context_independent(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Parsed model definition.
#[derive(Clone, Debug, Default)]
pub struct ModelDefinition {
    pub version: String,
    pub n_base: usize,
    pub n_tri: usize,
    pub n_state_map: usize,
    pub n_tied_state: usize,
    pub n_tied_ci_state: usize,
    pub n_tied_tmat: usize,
    pub entries: Vec<MdefEntry>,
}

impl ModelDefinition {
    /// Context-independent rows.
    pub fn base_entries(&self) -> impl Iterator<Item = &MdefEntry> {
        self.entries.iter().filter(|e| e.is_context_independent())
    }

    /// Triphone rows.
    pub fn triphone_entries(&self) -> impl Iterator<Item = &MdefEntry> {
        self.entries.iter().filter(|e| !e.is_context_independent())
    }
}

const HEADER_KEYS: [&str; 6] = [
    "n_base",
    "n_tri",
    "n_state_map",
    "n_tied_state",
    "n_tied_ci_state",
    "n_tied_tmat",
];

/// Parse a text model definition and check its header against its rows.
pub fn parse(text: &str) -> Result<ModelDefinition, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .peekable();

    let mut definition = ModelDefinition::default();

    let (_, version) = lines.next().ok_or(LoadError::Mdef {
        line: 1,
        reason: "empty model definition".to_string(),
    })?;
    definition.version = version.to_string();

    let mut seen = [false; HEADER_KEYS.len()];

    while let Some(&(line, text)) = lines.peek() {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let &[value, key] = &tokens[..] else { break };
        let Some(slot) = HEADER_KEYS.iter().position(|k| *k == key) else {
            break;
        };

        let value = parse_number(value, line, key)?;
        *header_field(&mut definition, slot) = value;
        seen[slot] = true;
        lines.next();
    }

    if let Some(slot) = seen.iter().position(|s| !s) {
        return Err(LoadError::Mdef {
            line: lines.peek().map_or(0, |(line, _)| *line),
            reason: format!("missing header field {}", HEADER_KEYS[slot]),
        });
    }

    for (line, text) in lines {
        definition.entries.push(parse_entry(line, text)?);
    }

    validate(&definition)?;

    Ok(definition)
}

fn header_field(definition: &mut ModelDefinition, slot: usize) -> &mut usize {
    match slot {
        0 => &mut definition.n_base,
        1 => &mut definition.n_tri,
        2 => &mut definition.n_state_map,
        3 => &mut definition.n_tied_state,
        4 => &mut definition.n_tied_ci_state,
        _ => &mut definition.n_tied_tmat,
    }
}

fn parse_number(token: &str, line: usize, what: &str) -> Result<usize, LoadError> {
    token.parse().map_err(|_| LoadError::Mdef {
        line,
        reason: format!("invalid {what}: {token:?}"),
    })
}

fn parse_entry(line: usize, text: &str) -> Result<MdefEntry, LoadError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mdef_err = |reason: &str| LoadError::Mdef {
        line,
        reason: reason.to_string(),
    };

    let [base, left, right, position, attrib, tmat, rest @ ..] = &tokens[..] else {
        return Err(mdef_err("expected: base lft rt p attrib tmat states... N"));
    };

    let [states @ .., terminator] = rest else {
        return Err(mdef_err("missing state list"));
    };

    if *terminator != "N" {
        return Err(mdef_err("state list must end with N"));
    }

    if states.is_empty() {
        return Err(mdef_err("hmm has no emitting states"));
    }

    let context_side = |token: &str| (token != "-").then(|| token.to_string());
    let left = context_side(left);
    let right = context_side(right);

    if left.is_some() != right.is_some() {
        return Err(mdef_err("left and right context must both be given or both be '-'"));
    }

    let position = position.parse::<HmmPosition>()?;

    if left.is_none() && position != HmmPosition::Undefined {
        return Err(mdef_err("context-independent unit must have position '-'"));
    }

    let states = states
        .iter()
        .map(|s| parse_number(s, line, "state id"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MdefEntry {
        line,
        base: base.to_string(),
        left,
        right,
        position,
        filler: *attrib == "filler",
        tmat: parse_number(tmat, line, "tmat id")?,
        states,
    })
}

fn validate(definition: &ModelDefinition) -> Result<(), LoadError> {
    let checks = [
        ("base phones", definition.n_base, definition.base_entries().count()),
        ("triphones", definition.n_tri, definition.triphone_entries().count()),
        (
            "state map entries",
            definition.n_state_map,
            definition.entries.iter().map(|e| e.states.len() + 1).sum(),
        ),
    ];

    for (what, declared, found) in checks {
        if declared != found {
            return Err(LoadError::CountMismatch {
                what,
                declared,
                found,
            });
        }
    }

    Ok(())
}
