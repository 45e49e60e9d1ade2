//! Editor options — the `set` command.
//!
//! Two options exist, both changeable at runtime from the `>` prompt or at
//! startup from the command line:
//!
//! | Name      | Abbrev | Type    | Default | Effect                         |
//! |-----------|--------|---------|---------|--------------------------------|
//! | `wrap`    |        | bool    | off     | Soft-wrap long rows            |
//! | `tabstop` | `ts`   | integer | 4       | Columns between tab stops      |
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `set option`     | Enable boolean / show numeric |
//! | `set nooption`   | Disable boolean               |
//! | `set option!`    | Toggle boolean                |
//! | `set option?`    | Query current value           |
//! | `set option=N`   | Assign numeric value          |
//! | `set`            | Show changed options          |
//! | `set all`        | Show all options              |

use crate::coords::{CoordinateMapper, DEFAULT_TAB_STOP};
use crate::error::OptionError;
use crate::layout::LayoutMode;

/// Smallest accepted `tabstop`.
pub const MIN_TAB_STOP: usize = 1;

/// Largest accepted `tabstop`.
pub const MAX_TAB_STOP: usize = 16;

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option` — enable a boolean option.
    On(String),
    /// `set nooption` — disable a boolean option.
    Off(String),
    /// `set option!` — toggle a boolean option.
    Toggle(String),
    /// `set option?` — query the current value.
    Query(String),
    /// `set option=value` — assign a value.
    Assign(String, String),
    /// `set` with no arguments — show changed options.
    ShowChanged,
    /// `set all` — show all options.
    ShowAll,
}

/// Returns `true` if `name` is a known boolean option.
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    name == "wrap"
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(name, "tabstop" | "ts")
}

/// Parse the `set` arguments into directives.
///
/// Several space-separated arguments are allowed (`set wrap ts=8`). An
/// empty argument string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `no` only negates a known boolean, so an option whose name happens
    // to start with "no" still parses as itself.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // A bare numeric option name shows its value.
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option names after abbreviation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    Wrap,
    TabStop,
}

impl OptionName {
    fn lookup(name: &str) -> Result<Self, OptionError> {
        match name {
            "wrap" => Ok(Self::Wrap),
            "tabstop" | "ts" => Ok(Self::TabStop),
            _ => Err(OptionError::UnknownOption(name.to_string())),
        }
    }
}

/// Runtime configuration of one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    tab_stop: usize,
    wrap: bool,
}

impl Options {
    /// Defaults: tab stop 4, no wrapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            wrap: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    #[inline]
    #[must_use]
    pub const fn wrap(&self) -> bool {
        self.wrap
    }

    /// The layout mode the `wrap` option selects.
    #[must_use]
    pub const fn layout_mode(&self) -> LayoutMode {
        if self.wrap {
            LayoutMode::Wrap
        } else {
            LayoutMode::Scroll
        }
    }

    /// A coordinate mapper using the current tab stop.
    #[must_use]
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.tab_stop)
    }

    pub const fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    /// Set the tab stop.
    ///
    /// # Errors
    ///
    /// [`OptionError::InvalidValue`] outside `MIN_TAB_STOP..=MAX_TAB_STOP`.
    pub fn set_tab_stop(&mut self, tab_stop: usize) -> Result<(), OptionError> {
        if !(MIN_TAB_STOP..=MAX_TAB_STOP).contains(&tab_stop) {
            return Err(OptionError::InvalidValue {
                name: "tabstop".into(),
                value: tab_stop.to_string(),
            });
        }
        self.tab_stop = tab_stop;
        Ok(())
    }

    // -- Directives ---------------------------------------------------------

    /// Apply directives in order. Returns the text of any queries, joined
    /// by two spaces, or `None` when nothing was queried.
    ///
    /// # Errors
    ///
    /// Stops at the first directive that fails; earlier ones stay applied.
    pub fn apply_all(
        &mut self,
        directives: &[SetDirective],
    ) -> Result<Option<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in directives {
            if let Some(text) = self.apply(directive)? {
                shown.push(text);
            }
        }
        Ok((!shown.is_empty()).then(|| shown.join("  ")))
    }

    /// Apply one directive. Queries return the option's display text.
    ///
    /// # Errors
    ///
    /// [`OptionError::UnknownOption`] for an unknown name,
    /// [`OptionError::InvalidValue`] for a value the option can't take
    /// (including boolean operations on `tabstop` and assignments to `wrap`).
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::ShowChanged => Ok(Some(self.describe_changed())),
            SetDirective::ShowAll => Ok(Some(self.describe_all())),
            SetDirective::Query(name) => {
                let option = OptionName::lookup(name)?;
                Ok(Some(self.describe(option)))
            }
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |old| !old),
            SetDirective::Assign(name, value) => match OptionName::lookup(name)? {
                OptionName::TabStop => {
                    let parsed = value.parse::<usize>().map_err(|_| OptionError::InvalidValue {
                        name: name.clone(),
                        value: value.clone(),
                    })?;
                    self.set_tab_stop(parsed)?;
                    tracing::debug!(tab_stop = parsed, "tabstop set");
                    Ok(None)
                }
                OptionName::Wrap => Err(OptionError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                }),
            },
        }
    }

    fn set_bool(
        &mut self,
        name: &str,
        update: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        match OptionName::lookup(name)? {
            OptionName::Wrap => {
                self.wrap = update(self.wrap);
                tracing::debug!(wrap = self.wrap, "wrap set");
                Ok(None)
            }
            OptionName::TabStop => Err(OptionError::InvalidValue {
                name: name.to_string(),
                value: String::new(),
            }),
        }
    }

    // -- Display ------------------------------------------------------------

    fn describe(&self, option: OptionName) -> String {
        match option {
            OptionName::Wrap => format_bool("wrap", self.wrap),
            OptionName::TabStop => format!("tabstop={}", self.tab_stop),
        }
    }

    fn describe_all(&self) -> String {
        format!(
            "{}  {}",
            self.describe(OptionName::Wrap),
            self.describe(OptionName::TabStop)
        )
    }

    fn describe_changed(&self) -> String {
        let defaults = Self::new();
        let mut changed = Vec::new();
        if self.wrap != defaults.wrap {
            changed.push(self.describe(OptionName::Wrap));
        }
        if self.tab_stop != defaults.tab_stop {
            changed.push(self.describe(OptionName::TabStop));
        }
        if changed.is_empty() {
            "all options at defaults".to_string()
        } else {
            changed.join("  ")
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_set_arg ------------------------------------------------------

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("wrap"), SetDirective::On("wrap".into()));
        assert_eq!(parse_set_arg("nowrap"), SetDirective::Off("wrap".into()));
        assert_eq!(parse_set_arg("wrap!"), SetDirective::Toggle("wrap".into()));
        assert_eq!(parse_set_arg("wrap?"), SetDirective::Query("wrap".into()));
    }

    #[test]
    fn parse_assign() {
        assert_eq!(
            parse_set_arg("ts=8"),
            SetDirective::Assign("ts".into(), "8".into())
        );
        assert_eq!(
            parse_set_arg("tabstop=2"),
            SetDirective::Assign("tabstop".into(), "2".into())
        );
    }

    #[test]
    fn parse_numeric_bare_is_query() {
        assert_eq!(parse_set_arg("tabstop"), SetDirective::Query("tabstop".into()));
        assert_eq!(parse_set_arg("ts"), SetDirective::Query("ts".into()));
    }

    #[test]
    fn parse_no_prefix_needs_known_boolean() {
        assert_eq!(parse_set_arg("notes"), SetDirective::On("notes".into()));
    }

    #[test]
    fn parse_set_multiple_and_empty() {
        assert_eq!(parse_set(""), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("  all "), vec![SetDirective::ShowAll]);
        assert_eq!(
            parse_set("wrap ts=8"),
            vec![
                SetDirective::On("wrap".into()),
                SetDirective::Assign("ts".into(), "8".into()),
            ]
        );
    }

    #[test]
    fn format_bool_prefixes_no() {
        assert_eq!(format_bool("wrap", true), "wrap");
        assert_eq!(format_bool("wrap", false), "nowrap");
    }

    // -- Options ------------------------------------------------------------

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.tab_stop(), 4);
        assert!(!opts.wrap());
        assert_eq!(opts.layout_mode(), LayoutMode::Scroll);
        assert_eq!(opts.mapper().tab_stop(), 4);
    }

    #[test]
    fn wrap_on_off_toggle() {
        let mut opts = Options::new();
        opts.apply(&SetDirective::On("wrap".into())).unwrap();
        assert_eq!(opts.layout_mode(), LayoutMode::Wrap);
        opts.apply(&SetDirective::Toggle("wrap".into())).unwrap();
        assert!(!opts.wrap());
        opts.apply(&SetDirective::Toggle("wrap".into())).unwrap();
        opts.apply(&SetDirective::Off("wrap".into())).unwrap();
        assert!(!opts.wrap());
    }

    #[test]
    fn assign_tabstop_by_abbreviation() {
        let mut opts = Options::new();
        assert_eq!(opts.apply_all(&parse_set("ts=8")), Ok(None));
        assert_eq!(opts.tab_stop(), 8);
        assert_eq!(opts.mapper().cx_to_rx(b"\tx", 1), 8);
    }

    #[test]
    fn tabstop_out_of_range() {
        let mut opts = Options::new();
        assert_eq!(
            opts.apply_all(&parse_set("ts=0")),
            Err(OptionError::InvalidValue {
                name: "tabstop".into(),
                value: "0".into(),
            })
        );
        assert!(opts.set_tab_stop(17).is_err());
        assert!(opts.set_tab_stop(16).is_ok());
    }

    #[test]
    fn tabstop_not_a_number() {
        let mut opts = Options::new();
        assert_eq!(
            opts.apply_all(&parse_set("ts=wide")),
            Err(OptionError::InvalidValue {
                name: "ts".into(),
                value: "wide".into(),
            })
        );
        assert_eq!(opts.tab_stop(), 4);
    }

    #[test]
    fn unknown_option() {
        let mut opts = Options::new();
        assert_eq!(
            opts.apply_all(&parse_set("number")),
            Err(OptionError::UnknownOption("number".into()))
        );
    }

    #[test]
    fn boolean_ops_on_numeric_are_invalid() {
        let mut opts = Options::new();
        assert!(opts.apply(&SetDirective::Toggle("ts".into())).is_err());
        assert!(opts.apply(&SetDirective::Assign("wrap".into(), "1".into())).is_err());
    }

    #[test]
    fn queries_report_values() {
        let mut opts = Options::new();
        assert_eq!(
            opts.apply_all(&parse_set("wrap? ts")),
            Ok(Some("nowrap  tabstop=4".into()))
        );
        assert_eq!(
            opts.apply_all(&parse_set("all")),
            Ok(Some("nowrap  tabstop=4".into()))
        );
    }

    #[test]
    fn show_changed() {
        let mut opts = Options::new();
        assert_eq!(
            opts.apply_all(&parse_set("")),
            Ok(Some("all options at defaults".into()))
        );
        opts.set_wrap(true);
        assert_eq!(opts.apply_all(&parse_set("")), Ok(Some("wrap".into())));
    }

    #[test]
    fn earlier_directives_stay_applied_on_error() {
        let mut opts = Options::new();
        assert!(opts.apply_all(&parse_set("wrap bogus")).is_err());
        assert!(opts.wrap());
    }
}
