use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use paste::paste;
use ds_model::Parameters;
use ds_model::State;

// ============================================================
//  Initial conditions
// ============================================================

/// Parse one initial condition, written as `S0,R0` or `S0 R0`.
pub fn parse_state(s: &str) -> Result<State> {
    let fields: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();

    let [s0, r0] = fields.as_slice() else {
        bail!("expected two cell counts 'S0,R0', got '{}'", s.trim());
    };
    let s0: f64 = s0.parse().with_context(|| format!("invalid S0 '{}'", s0))?;
    let r0: f64 = r0.parse().with_context(|| format!("invalid R0 '{}'", r0))?;

    let state = State::new(s0, r0);
    state.validate_initial()?;
    Ok(state)
}

/// One initial condition per line. Blank lines and `#` comments are
/// skipped. At least one condition is required.
pub fn read_initial_conditions<R: BufRead>(reader: R) -> Result<Vec<State>> {
    let mut states = Vec::new();
    for (lnum, line) in reader.lines().enumerate() {
        let line = line?;
        let line = match line.split_once('#') {
            Some((content, _)) => content,
            None => line.as_str(),
        }.trim();
        if line.is_empty() {
            continue;
        }
        let state = parse_state(line)
            .with_context(|| format!("line {}", lnum + 1))?;
        states.push(state);
    }
    if states.is_empty() {
        return Err(anyhow!("no initial conditions found"));
    }
    Ok(states)
}

// ============================================================
//  Macro generating file/string/stdin/input helpers
// ============================================================

/// Generate input adapters for a base parser function `fn base<R: BufRead>(R) -> Result<T>`.
///
/// This expands into:
/// - `base_string(&str)`
/// - `base_file<P: AsRef<Path>>(P)`
/// - `base_stdin()`
/// - `base_input(&str)`  (dispatches "-" → stdin, otherwise → file)
macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let path = path.as_ref();
                let file = File::open(path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                $base(BufReader::new(file))
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

define_input_variants!(read_initial_conditions, Result<Vec<State>>);

/// The starting points shown in the phase plane unless the user picks
/// their own. One of them sits just below the resistant-only equilibrium
/// K/m and is left out when that equilibrium does not exist.
pub fn default_phase_plane_conditions(p: &Parameters) -> Vec<State> {
    let mut states = vec![
        State::new(1e6, 1e5),
        State::new(1e5, 1.4e5),
    ];
    if p.m() > 0.0 {
        let r = p.k() / p.m() - 100.0;
        if r >= 0.0 {
            states.push(State::new(4e4, r));
        }
    }
    states.push(State::new(11e5, 5e4));
    states.push(State::new(17e5, 2e4));
    states
}

// ============================================================
//  Unit tests
// ============================================================
