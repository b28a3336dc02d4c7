//! Normalization of MeCab configuration options.
//!
//! MeCab's model constructor takes a single command-line-style argument
//! string. [`MecabOptions`] is the typed, validated form of that string:
//! it can be built programmatically with `with_*` setters or parsed from
//! the CLI syntax MeCab itself accepts, and it serializes back to a
//! deterministic invocation string.

use crate::constants::{NBEST_MAX, NBEST_MIN};
use crate::error::{MecabError, Result};

/// Typed set of recognized MeCab options.
///
/// The option set is closed: every recognized MeCab flag has a dedicated
/// field, so unknown keys are unrepresentable. Unset fields are omitted
/// from the serialized invocation string.
///
/// ## Examples
/// ```
/// use mecab_rs::MecabOptions;
///
/// let options = MecabOptions::new().with_nbest(5).with_all_morphs();
/// assert_eq!(options.to_invocation_string(), "--all-morphs --nbest=5");
///
/// let parsed = MecabOptions::parse("-N 5 --all-morphs").unwrap();
/// assert_eq!(parsed, options);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MecabOptions {
    /// Resource file (`-r`, `--rcfile`).
    pub rcfile: Option<String>,
    /// System dictionary directory (`-d`, `--dicdir`).
    pub dicdir: Option<String>,
    /// User dictionary file (`-u`, `--userdic`).
    pub userdic: Option<String>,
    /// Lattice information level (`-l`, deprecated; use `marginal`/`nbest`).
    pub lattice_level: Option<i32>,
    /// Output format type such as `wakati` or `chasen` (`-O`).
    pub output_format_type: Option<String>,
    /// Output all morphemes (`-a`, `--all-morphs`).
    pub all_morphs: bool,
    /// Number of best paths to retrieve, in `[1, 512]` (`-N`, `--nbest`).
    pub nbest: Option<i32>,
    /// Partial parsing mode (`-p`, `--partial`).
    pub partial: bool,
    /// Compute marginal probabilities (`-m`, `--marginal`).
    pub marginal: bool,
    /// Maximum grouping size for unknown words (`-M`).
    pub max_grouping_size: Option<i32>,
    /// User-defined node format (`-F`, `--node-format`).
    pub node_format: Option<String>,
    /// User-defined unknown-node format (`-U`, `--unk-format`).
    pub unk_format: Option<String>,
    /// User-defined begin-of-sentence format (`-B`, `--bos-format`).
    pub bos_format: Option<String>,
    /// User-defined end-of-sentence format (`-E`, `--eos-format`).
    pub eos_format: Option<String>,
    /// User-defined end-of-N-best format (`-S`, `--eon-format`).
    pub eon_format: Option<String>,
    /// Feature string assigned to unknown words (`-x`, `--unk-feature`).
    pub unk_feature: Option<String>,
    /// Input buffer size in bytes (`-b`, `--input-buffer-size`).
    pub input_buffer_size: Option<i32>,
    /// Allocate new memory for the input sentence (`-C`).
    pub allocate_sentence: bool,
    /// Temperature parameter theta (`-t`, `--theta`).
    pub theta: Option<f32>,
    /// Cost factor (`-c`, `--cost-factor`).
    pub cost_factor: Option<i32>,
}

enum OptionKind {
    Flag,
    Int,
    Float,
    Text,
}

/// Canonical declaration order of the recognized options. Serialization
/// follows this order so invocation strings are deterministic.
const SUPPORTED_OPTS: &[(&str, &str, OptionKind)] = &[
    ("-r", "--rcfile", OptionKind::Text),
    ("-d", "--dicdir", OptionKind::Text),
    ("-u", "--userdic", OptionKind::Text),
    ("-l", "--lattice-level", OptionKind::Int),
    ("-O", "--output-format-type", OptionKind::Text),
    ("-a", "--all-morphs", OptionKind::Flag),
    ("-N", "--nbest", OptionKind::Int),
    ("-p", "--partial", OptionKind::Flag),
    ("-m", "--marginal", OptionKind::Flag),
    ("-M", "--max-grouping-size", OptionKind::Int),
    ("-F", "--node-format", OptionKind::Text),
    ("-U", "--unk-format", OptionKind::Text),
    ("-B", "--bos-format", OptionKind::Text),
    ("-E", "--eos-format", OptionKind::Text),
    ("-S", "--eon-format", OptionKind::Text),
    ("-x", "--unk-feature", OptionKind::Text),
    ("-b", "--input-buffer-size", OptionKind::Int),
    ("-C", "--allocate-sentence", OptionKind::Flag),
    ("-t", "--theta", OptionKind::Float),
    ("-c", "--cost-factor", OptionKind::Int),
];

const LATTICE_LEVEL_WARNING: &str =
    "lattice-level is DEPRECATED, please use marginal or nbest";

impl MecabOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a MeCab command-line-style option string.
    ///
    /// Accepts `--key=value`, `--key value`, `-X value`, and `-Xvalue`
    /// forms. Unrecognized tokens are silently skipped, matching the
    /// lenience of MeCab's own front end. Fails with
    /// [`MecabError::InvalidOptions`] when a value cannot be coerced to
    /// its declared type or `nbest` falls outside `[1, 512]`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut options = Self::default();
        let mut tokens = input.split_whitespace().peekable();

        while let Some(token) = tokens.next() {
            let (long, kind, inline_value) = match lookup_token(token) {
                Some(found) => found,
                None => continue,
            };

            if matches!(kind, OptionKind::Flag) {
                options.set_flag(long);
                continue;
            }

            let value = match inline_value {
                Some(value) => value.to_string(),
                None => match tokens.next() {
                    Some(value) => value.to_string(),
                    None => {
                        return Err(MecabError::InvalidOptions(format!(
                            "{long} requires an argument"
                        )))
                    }
                },
            };
            options.set_value(long, kind, value.trim())?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Serializes to the argument string `mecab_model_new2` expects.
    ///
    /// Keys appear in canonical declaration order regardless of how the
    /// options were built; flags emit only `--key` and are omitted when
    /// false.
    pub fn to_invocation_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (_, long, kind) in SUPPORTED_OPTS {
            match kind {
                OptionKind::Flag => {
                    if self.flag_value(long) {
                        parts.push((*long).to_string());
                    }
                }
                _ => {
                    if let Some(value) = self.value_repr(long) {
                        parts.push(format!("{long}={value}"));
                    }
                }
            }
        }
        parts.join(" ")
    }

    /// Checks option invariants without touching the native library.
    ///
    /// Emits the lattice-level deprecation warning on stderr when that
    /// legacy knob is set; deprecation never fails validation.
    pub fn validate(&self) -> Result<()> {
        if self.lattice_level.is_some() {
            eprintln!("{LATTICE_LEVEL_WARNING}");
        }
        if let Some(nbest) = self.nbest {
            if !(NBEST_MIN..=NBEST_MAX).contains(&nbest) {
                return Err(MecabError::InvalidOptions(format!(
                    "nbest must be in [{NBEST_MIN}, {NBEST_MAX}], got {nbest}"
                )));
            }
        }
        Ok(())
    }

    /// Sets the resource file.
    pub fn with_rcfile(mut self, rcfile: impl Into<String>) -> Self {
        self.rcfile = Some(rcfile.into());
        self
    }

    /// Sets the system dictionary directory.
    pub fn with_dicdir(mut self, dicdir: impl Into<String>) -> Self {
        self.dicdir = Some(dicdir.into());
        self
    }

    /// Sets the user dictionary file.
    pub fn with_userdic(mut self, userdic: impl Into<String>) -> Self {
        self.userdic = Some(userdic.into());
        self
    }

    /// Sets the deprecated lattice level.
    pub fn with_lattice_level(mut self, lattice_level: i32) -> Self {
        self.lattice_level = Some(lattice_level);
        self
    }

    /// Sets the output format type (`wakati`, `chasen`, `yomi`, ...).
    pub fn with_output_format_type(mut self, output_format_type: impl Into<String>) -> Self {
        self.output_format_type = Some(output_format_type.into());
        self
    }

    /// Requests output of all morphemes.
    pub fn with_all_morphs(mut self) -> Self {
        self.all_morphs = true;
        self
    }

    /// Sets the N-best path count.
    pub fn with_nbest(mut self, nbest: i32) -> Self {
        self.nbest = Some(nbest);
        self
    }

    /// Enables partial parsing mode.
    pub fn with_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Enables marginal probability output.
    pub fn with_marginal(mut self) -> Self {
        self.marginal = true;
        self
    }

    /// Sets the maximum grouping size for unknown words.
    pub fn with_max_grouping_size(mut self, max_grouping_size: i32) -> Self {
        self.max_grouping_size = Some(max_grouping_size);
        self
    }

    /// Sets the node format string.
    pub fn with_node_format(mut self, node_format: impl Into<String>) -> Self {
        self.node_format = Some(node_format.into());
        self
    }

    /// Sets the unknown-node format string.
    pub fn with_unk_format(mut self, unk_format: impl Into<String>) -> Self {
        self.unk_format = Some(unk_format.into());
        self
    }

    /// Sets the begin-of-sentence format string.
    pub fn with_bos_format(mut self, bos_format: impl Into<String>) -> Self {
        self.bos_format = Some(bos_format.into());
        self
    }

    /// Sets the end-of-sentence format string.
    pub fn with_eos_format(mut self, eos_format: impl Into<String>) -> Self {
        self.eos_format = Some(eos_format.into());
        self
    }

    /// Sets the end-of-N-best format string.
    pub fn with_eon_format(mut self, eon_format: impl Into<String>) -> Self {
        self.eon_format = Some(eon_format.into());
        self
    }

    /// Sets the unknown-word feature string.
    pub fn with_unk_feature(mut self, unk_feature: impl Into<String>) -> Self {
        self.unk_feature = Some(unk_feature.into());
        self
    }

    /// Sets the input buffer size.
    pub fn with_input_buffer_size(mut self, input_buffer_size: i32) -> Self {
        self.input_buffer_size = Some(input_buffer_size);
        self
    }

    /// Requests allocation of new memory for the input sentence.
    pub fn with_allocate_sentence(mut self) -> Self {
        self.allocate_sentence = true;
        self
    }

    /// Sets the temperature parameter theta.
    pub fn with_theta(mut self, theta: f32) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Sets the cost factor.
    pub fn with_cost_factor(mut self, cost_factor: i32) -> Self {
        self.cost_factor = Some(cost_factor);
        self
    }

    fn set_flag(&mut self, long: &str) {
        match long {
            "--all-morphs" => self.all_morphs = true,
            "--partial" => self.partial = true,
            "--marginal" => self.marginal = true,
            "--allocate-sentence" => self.allocate_sentence = true,
            _ => unreachable!("flag table and setter table out of sync"),
        }
    }

    fn set_value(&mut self, long: &str, kind: &OptionKind, value: &str) -> Result<()> {
        match kind {
            OptionKind::Int => {
                let parsed: i32 = value.parse().map_err(|_| {
                    MecabError::InvalidOptions(format!(
                        "{long} expects an integer, got '{value}'"
                    ))
                })?;
                match long {
                    "--lattice-level" => self.lattice_level = Some(parsed),
                    "--nbest" => self.nbest = Some(parsed),
                    "--max-grouping-size" => self.max_grouping_size = Some(parsed),
                    "--input-buffer-size" => self.input_buffer_size = Some(parsed),
                    "--cost-factor" => self.cost_factor = Some(parsed),
                    _ => unreachable!("int table and setter table out of sync"),
                }
            }
            OptionKind::Float => {
                let parsed: f32 = value.parse().map_err(|_| {
                    MecabError::InvalidOptions(format!(
                        "{long} expects a number, got '{value}'"
                    ))
                })?;
                match long {
                    "--theta" => self.theta = Some(parsed),
                    _ => unreachable!("float table and setter table out of sync"),
                }
            }
            OptionKind::Text => {
                let owned = value.to_string();
                match long {
                    "--rcfile" => self.rcfile = Some(owned),
                    "--dicdir" => self.dicdir = Some(owned),
                    "--userdic" => self.userdic = Some(owned),
                    "--output-format-type" => self.output_format_type = Some(owned),
                    "--node-format" => self.node_format = Some(owned),
                    "--unk-format" => self.unk_format = Some(owned),
                    "--bos-format" => self.bos_format = Some(owned),
                    "--eos-format" => self.eos_format = Some(owned),
                    "--eon-format" => self.eon_format = Some(owned),
                    "--unk-feature" => self.unk_feature = Some(owned),
                    _ => unreachable!("text table and setter table out of sync"),
                }
            }
            OptionKind::Flag => unreachable!("flags are handled before value coercion"),
        }
        Ok(())
    }

    fn flag_value(&self, long: &str) -> bool {
        match long {
            "--all-morphs" => self.all_morphs,
            "--partial" => self.partial,
            "--marginal" => self.marginal,
            "--allocate-sentence" => self.allocate_sentence,
            _ => unreachable!("flag table and getter table out of sync"),
        }
    }

    fn value_repr(&self, long: &str) -> Option<String> {
        match long {
            "--rcfile" => self.rcfile.clone(),
            "--dicdir" => self.dicdir.clone(),
            "--userdic" => self.userdic.clone(),
            "--lattice-level" => self.lattice_level.map(|v| v.to_string()),
            "--output-format-type" => self.output_format_type.clone(),
            "--nbest" => self.nbest.map(|v| v.to_string()),
            "--max-grouping-size" => self.max_grouping_size.map(|v| v.to_string()),
            "--node-format" => self.node_format.clone(),
            "--unk-format" => self.unk_format.clone(),
            "--bos-format" => self.bos_format.clone(),
            "--eos-format" => self.eos_format.clone(),
            "--eon-format" => self.eon_format.clone(),
            "--unk-feature" => self.unk_feature.clone(),
            "--input-buffer-size" => self.input_buffer_size.map(|v| v.to_string()),
            "--theta" => self.theta.map(|v| v.to_string()),
            "--cost-factor" => self.cost_factor.map(|v| v.to_string()),
            _ => unreachable!("value table and getter table out of sync"),
        }
    }
}

/// Matches one CLI token against the option table, returning the canonical
/// long name, kind, and any value glued onto the token (`--key=value` or
/// `-Xvalue`).
fn lookup_token(token: &str) -> Option<(&'static str, &'static OptionKind, Option<&str>)> {
    for (short, long, kind) in SUPPORTED_OPTS {
        if token == *short || token == *long {
            return Some((*long, kind, None));
        }
        if matches!(kind, OptionKind::Flag) {
            continue;
        }
        if let Some(rest) = token.strip_prefix(long) {
            if let Some(value) = rest.strip_prefix('=') {
                return Some((*long, kind, Some(value)));
            }
        }
        if let Some(rest) = token.strip_prefix(short) {
            if !rest.is_empty() {
                // Attached values may carry a separating '=' (-O=wakati).
                let value = rest.strip_prefix('=').unwrap_or(rest);
                return Some((*long, kind, Some(value)));
            }
        }
    }
    None
}
