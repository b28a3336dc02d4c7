use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use crate::constants::{
    MECAB_LATTICE_ALLOCATE_SENTENCE, MECAB_LATTICE_ALL_MORPHS, MECAB_LATTICE_MARGINAL_PROB,
    MECAB_LATTICE_NBEST, MECAB_LATTICE_ONE_BEST, MECAB_LATTICE_PARTIAL,
};
use crate::discovery::resolve_library_path;
use crate::error::{MecabError, Result};
use crate::model::{DictionaryInfo, MecabNode};
use crate::native::{
    cstr_to_string, lattice_error, tagger_error, DynamicLibrary, LoadedLibrary, MecabApi,
    MecabLatticeHandle, MecabModelHandle, MecabNodeRaw, MecabTaggerHandle,
};
use crate::options::MecabOptions;
use crate::segment::{boundary_marks, tokenize_by_features, tokenize_by_pattern, Pattern};

/// Handle to a loaded MeCab dynamic library plus resolved function table.
///
/// This type is useful when you want explicit control over which shared
/// library is loaded before creating analyzers.
#[derive(Clone)]
#[derive(Debug)]
pub struct MecabLibrary {
    inner: Arc<LoadedLibrary>,
    path: PathBuf,
}

impl MecabLibrary {
    /// Loads a MeCab dynamic library from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let library = DynamicLibrary::open(&path)?;
        let api = unsafe { MecabApi::load(&library)? };
        Ok(Self {
            inner: Arc::new(LoadedLibrary {
                _library: library,
                api,
            }),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Loads MeCab using `MECAB_PATH` if set, otherwise platform discovery
    /// (the MeCab install's own configuration, then well-known locations).
    pub fn load_default() -> Result<Self> {
        let path = resolve_library_path()?;
        Self::load(path)
    }

    /// Returns the MeCab library version string.
    pub fn version(&self) -> String {
        let pointer = unsafe { (self.inner.api.mecab_version)() };
        cstr_to_string(pointer)
    }

    /// Returns the path this library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse strategy decided once at construction from the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Retrieve only the single best path.
    SingleBest,
    /// Retrieve the N lowest-cost paths.
    NBest(i32),
}

pub(crate) fn parse_mode_for(options: &MecabOptions) -> ParseMode {
    match options.nbest {
        Some(n) if n > 1 => ParseMode::NBest(n),
        _ => ParseMode::SingleBest,
    }
}

/// Constraint applied to one parse call.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Force morpheme boundaries around every match of the pattern.
    Boundary(Pattern),
    /// Override the feature string of exact-match morphemes.
    ///
    /// Entries are `(morpheme, feature)` pairs; earlier entries take
    /// priority when keys overlap.
    Features(Vec<(String, String)>),
}

impl Constraint {
    /// Boundary constraint from a literal string or a compiled regex.
    pub fn boundary(pattern: impl Into<Pattern>) -> Self {
        Constraint::Boundary(pattern.into())
    }

    /// Feature constraint from ordered `(morpheme, feature)` pairs.
    pub fn features<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Constraint::Features(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Checks caller-side text requirements before any native call.
pub(crate) fn check_text_argument(options: &MecabOptions, text: &str) -> Result<()> {
    if options.partial && !text.ends_with('\n') {
        return Err(MecabError::InvalidArgument(
            "partial parsing requires a new-line char at end of text".to_string(),
        ));
    }
    Ok(())
}

/// Keeps the C strings referenced by the lattice alive for the duration
/// of one parse call; the native library does not copy the sentence
/// unless `allocate_sentence` is requested.
struct SentenceGuard {
    _sentence: CString,
    _features: Vec<CString>,
}

/// High-level MeCab analyzer instance.
///
/// Owns a native model/tagger/lattice triple exclusively. The pair
/// carries mutable parse state between configuration and result-reading
/// steps, so an instance must not be shared across threads; construct
/// one analyzer per thread instead. Handles are released exactly once,
/// lattice first, then tagger, then model, either by [`Mecab::close`]
/// or on drop.
///
/// ## Examples
/// ```no_run
/// use mecab_rs::{Mecab, MecabOptions};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mecab = Mecab::new(MecabOptions::new())?;
///     print!("{}", mecab.parse("凡人にしか見えねえ風景ってのがあるんだよ。")?);
///     for node in mecab.parse_to_nodes("すもももももももものうち")? {
///         if node.is_normal() {
///             println!("{}\t{}", node.surface, node.feature);
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Mecab {
    inner: Arc<LoadedLibrary>,
    model: MecabModelHandle,
    tagger: MecabTaggerHandle,
    lattice: MecabLatticeHandle,
    options: MecabOptions,
    parse_mode: ParseMode,
    dicts: Vec<DictionaryInfo>,
    version: String,
    library_path: PathBuf,
}

impl Mecab {
    /// Creates an analyzer with the given options, loading the library
    /// via `MECAB_PATH` or platform discovery.
    pub fn new(options: MecabOptions) -> Result<Self> {
        let library = MecabLibrary::load_default()?;
        Self::with_library(&library, options)
    }

    /// Creates an analyzer from a MeCab command-line-style option string.
    ///
    /// ```no_run
    /// # use mecab_rs::Mecab;
    /// let mecab = Mecab::from_str_options("-O wakati")?;
    /// # Ok::<(), mecab_rs::MecabError>(())
    /// ```
    pub fn from_str_options(options: &str) -> Result<Self> {
        Self::new(MecabOptions::parse(options)?)
    }

    /// Creates an analyzer on an explicitly loaded library.
    pub fn with_library(library: &MecabLibrary, options: MecabOptions) -> Result<Self> {
        options.validate()?;
        let invocation = options.to_invocation_string();
        let api = &library.inner.api;

        let invocation_c = CString::new(invocation.clone())?;
        let model = unsafe { (api.mecab_model_new2)(invocation_c.as_ptr()) };
        if model.is_null() {
            return Err(MecabError::TaggerInit(format!(
                "could not initialize model with options '{invocation}'"
            )));
        }

        let tagger = unsafe { (api.mecab_model_new_tagger)(model) };
        if tagger.is_null() {
            unsafe { (api.mecab_model_destroy)(model) };
            return Err(MecabError::TaggerInit(format!(
                "could not initialize tagger with options '{invocation}'"
            )));
        }

        let lattice = unsafe { (api.mecab_model_new_lattice)(model) };
        if lattice.is_null() {
            unsafe {
                (api.mecab_destroy)(tagger);
                (api.mecab_model_destroy)(model);
            }
            return Err(MecabError::TaggerInit(format!(
                "could not initialize lattice with options '{invocation}'"
            )));
        }

        let parse_mode = parse_mode_for(&options);
        unsafe {
            match parse_mode {
                ParseMode::NBest(_) => {
                    (api.mecab_lattice_set_request_type)(lattice, MECAB_LATTICE_NBEST)
                }
                ParseMode::SingleBest => {
                    (api.mecab_lattice_set_request_type)(lattice, MECAB_LATTICE_ONE_BEST)
                }
            }
            if options.partial {
                (api.mecab_lattice_add_request_type)(lattice, MECAB_LATTICE_PARTIAL);
            }
            if options.marginal {
                (api.mecab_lattice_add_request_type)(lattice, MECAB_LATTICE_MARGINAL_PROB);
            }
            if options.all_morphs {
                (api.mecab_lattice_add_request_type)(lattice, MECAB_LATTICE_ALL_MORPHS);
            }
            if options.allocate_sentence {
                (api.mecab_lattice_add_request_type)(lattice, MECAB_LATTICE_ALLOCATE_SENTENCE);
            }
            if let Some(theta) = options.theta {
                (api.mecab_lattice_set_theta)(lattice, theta as f64);
            }
        }

        // Snapshot the dictionary chain once; it is owned by the model.
        let mut dicts = Vec::new();
        let mut info = unsafe { (api.mecab_model_dictionary_info)(model) };
        while !info.is_null() {
            let raw = unsafe { &*info };
            dicts.push(DictionaryInfo::from_raw(raw));
            info = raw.next;
        }

        let version = cstr_to_string(unsafe { (api.mecab_version)() });

        Ok(Self {
            inner: library.inner.clone(),
            model,
            tagger,
            lattice,
            options,
            parse_mode,
            dicts,
            version,
            library_path: library.path.clone(),
        })
    }

    /// Parses `text`, returning the MeCab output as a single string
    /// (N-best output when the analyzer was opened with `nbest` ≥ 2).
    pub fn parse(&self, text: &str) -> Result<String> {
        self.parse_to_string(text, None)
    }

    /// Parses `text` under a boundary or feature constraint.
    ///
    /// ```no_run
    /// # use mecab_rs::{Constraint, Mecab, MecabOptions};
    /// # let mecab = Mecab::new(MecabOptions::new())?;
    /// let out = mecab.parse_with(
    ///     "凡人にしか見えねえ風景ってのがあるんだよ。",
    ///     &Constraint::boundary("見えねえ風景"),
    /// )?;
    /// # Ok::<(), mecab_rs::MecabError>(())
    /// ```
    pub fn parse_with(&self, text: &str, constraint: &Constraint) -> Result<String> {
        self.parse_to_string(text, Some(constraint))
    }

    /// Parses `text` into owned node snapshots, BOS nodes excluded.
    ///
    /// Node parsing walks all N paths when the analyzer was opened with
    /// `nbest` ≥ 2; the end-of-N-best marker nodes separate the paths.
    pub fn parse_to_nodes(&self, text: &str) -> Result<Vec<MecabNode>> {
        self.collect_nodes(text, None)
    }

    /// Node parsing under a boundary or feature constraint.
    pub fn parse_to_nodes_with(
        &self,
        text: &str,
        constraint: &Constraint,
    ) -> Result<Vec<MecabNode>> {
        self.collect_nodes(text, Some(constraint))
    }

    /// Options this analyzer was opened with.
    pub fn options(&self) -> &MecabOptions {
        &self.options
    }

    /// Parse strategy decided at construction.
    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    /// Dictionary snapshot taken at construction, system dictionary first.
    pub fn dictionaries(&self) -> &[DictionaryInfo] {
        &self.dicts
    }

    /// MeCab library version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Path of the loaded MeCab shared library.
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    /// Releases the native handles now instead of at drop.
    ///
    /// Idempotent: calling this more than once (or dropping afterwards)
    /// does nothing further.
    pub fn close(&mut self) {
        self.release_handles();
    }

    fn api(&self) -> &MecabApi {
        &self.inner.api
    }

    fn parse_to_string(&self, text: &str, constraint: Option<&Constraint>) -> Result<String> {
        check_text_argument(&self.options, text)?;
        let _guard = self.configure_lattice(text, constraint)?;
        self.run_parse()?;

        let api = self.api();
        let pointer = unsafe {
            match self.parse_mode {
                ParseMode::NBest(n) => (api.mecab_lattice_nbest_tostr)(self.lattice, n as usize),
                ParseMode::SingleBest => (api.mecab_lattice_tostr)(self.lattice),
            }
        };
        if pointer.is_null() {
            return Err(MecabError::Parse(lattice_error(
                api,
                self.lattice,
                "lattice produced no output",
            )));
        }
        Ok(cstr_to_string(pointer))
    }

    fn collect_nodes(&self, text: &str, constraint: Option<&Constraint>) -> Result<Vec<MecabNode>> {
        check_text_argument(&self.options, text)?;
        let api = self.api();

        // Node iteration always drives the lattice through next(), which
        // requires the N-best request bit even in single-best mode.
        unsafe {
            if (api.mecab_lattice_has_request_type)(self.lattice, MECAB_LATTICE_NBEST) == 0 {
                (api.mecab_lattice_add_request_type)(self.lattice, MECAB_LATTICE_NBEST);
            }
        }

        let _guard = self.configure_lattice(text, constraint)?;
        self.run_parse()?;

        let paths = match self.parse_mode {
            ParseMode::NBest(n) => n,
            ParseMode::SingleBest => 1,
        };

        let format_features =
            self.options.output_format_type.is_some() || self.options.node_format.is_some();

        let mut nodes = Vec::new();
        for _ in 0..paths {
            let has_next = unsafe { (api.mecab_lattice_next)(self.lattice) };
            if has_next == 0 {
                break;
            }
            let mut pointer = unsafe { (api.mecab_lattice_get_bos_node)(self.lattice) };
            while !pointer.is_null() {
                let raw: &MecabNodeRaw = unsafe { &*pointer };
                let mut node = MecabNode::from_raw(raw);
                if !node.is_bos() {
                    if format_features {
                        let formatted =
                            unsafe { (api.mecab_format_node)(self.tagger, pointer) };
                        if formatted.is_null() {
                            return Err(MecabError::Parse(tagger_error(
                                api,
                                self.tagger,
                                "mecab_format_node returned a null pointer",
                            )));
                        }
                        node.feature = cstr_to_string(formatted);
                    }
                    nodes.push(node);
                }
                pointer = raw.next;
            }
        }
        Ok(nodes)
    }

    /// Sets the sentence and any constraint markers on the lattice.
    ///
    /// Returns a guard owning every C string the lattice now references;
    /// the caller must keep it alive until results have been read.
    fn configure_lattice(
        &self,
        text: &str,
        constraint: Option<&Constraint>,
    ) -> Result<SentenceGuard> {
        let api = self.api();
        match constraint {
            None => {
                let sentence = CString::new(text)?;
                unsafe {
                    (api.mecab_lattice_set_sentence)(self.lattice, sentence.as_ptr());
                }
                Ok(SentenceGuard {
                    _sentence: sentence,
                    _features: Vec::new(),
                })
            }
            Some(Constraint::Boundary(pattern)) => {
                let tokens = tokenize_by_pattern(text, pattern);
                let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
                let sentence = CString::new(joined)?;
                unsafe {
                    (api.mecab_lattice_set_sentence)(self.lattice, sentence.as_ptr());
                }
                for (bpos, mark) in boundary_marks(&tokens).into_iter().enumerate() {
                    unsafe {
                        (api.mecab_lattice_set_boundary_constraint)(self.lattice, bpos, mark);
                    }
                }
                Ok(SentenceGuard {
                    _sentence: sentence,
                    _features: Vec::new(),
                })
            }
            Some(Constraint::Features(pairs)) => {
                let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
                let tokens = tokenize_by_features(text, &keys);
                let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
                let sentence = CString::new(joined)?;
                unsafe {
                    (api.mecab_lattice_set_sentence)(self.lattice, sentence.as_ptr());
                }

                let mut features = Vec::new();
                let mut bpos = 0usize;
                for token in &tokens {
                    let len = token.text.len();
                    if token.constrained {
                        let feature = pairs
                            .iter()
                            .find(|(key, _)| *key == token.text)
                            .map(|(_, value)| value.as_str())
                            .ok_or_else(|| {
                                MecabError::InvalidArgument(format!(
                                    "no feature given for constrained segment '{}'",
                                    token.text
                                ))
                            })?;
                        let feature_c = CString::new(feature)?;
                        unsafe {
                            (api.mecab_lattice_set_feature_constraint)(
                                self.lattice,
                                bpos,
                                bpos + len,
                                feature_c.as_ptr(),
                            );
                        }
                        features.push(feature_c);
                    }
                    bpos += len;
                }
                Ok(SentenceGuard {
                    _sentence: sentence,
                    _features: features,
                })
            }
        }
    }

    fn run_parse(&self) -> Result<()> {
        let api = self.api();
        let status = unsafe { (api.mecab_parse_lattice)(self.tagger, self.lattice) };
        if status == 0 {
            return Err(MecabError::Parse(lattice_error(
                api,
                self.lattice,
                "mecab_parse_lattice failed",
            )));
        }
        Ok(())
    }

    /// Releases lattice, tagger, then model, in reverse acquisition
    /// order. Null checks make the release idempotent and skip handles
    /// that were never acquired.
    fn release_handles(&mut self) {
        let api = self.inner.api;
        if !self.lattice.is_null() {
            unsafe { (api.mecab_lattice_destroy)(self.lattice) };
            self.lattice = ptr::null_mut();
        }
        if !self.tagger.is_null() {
            unsafe { (api.mecab_destroy)(self.tagger) };
            self.tagger = ptr::null_mut();
        }
        if !self.model.is_null() {
            unsafe { (api.mecab_model_destroy)(self.model) };
            self.model = ptr::null_mut();
        }
    }
}

impl Drop for Mecab {
    fn drop(&mut self) {
        self.release_handles();
    }
}

#[cfg(test)]
mod runtime_tests {
    use super::{check_text_argument, parse_mode_for, Constraint, ParseMode};
    use crate::error::MecabError;
    use crate::options::MecabOptions;
    use crate::segment::Pattern;

    #[test]
    fn parse_mode_follows_nbest_option() {
        assert_eq!(
            parse_mode_for(&MecabOptions::new()),
            ParseMode::SingleBest
        );
        assert_eq!(
            parse_mode_for(&MecabOptions::new().with_nbest(1)),
            ParseMode::SingleBest
        );
        assert_eq!(
            parse_mode_for(&MecabOptions::new().with_nbest(5)),
            ParseMode::NBest(5)
        );
    }

    #[test]
    fn partial_mode_requires_trailing_newline() {
        let options = MecabOptions::new().with_partial();
        let error = check_text_argument(&options, "すもも").unwrap_err();
        assert!(matches!(error, MecabError::InvalidArgument(_)));
        assert!(check_text_argument(&options, "すもも\n").is_ok());
    }

    #[test]
    fn non_partial_mode_accepts_any_text() {
        assert!(check_text_argument(&MecabOptions::new(), "すもも").is_ok());
        assert!(check_text_argument(&MecabOptions::new(), "").is_ok());
    }

    #[test]
    fn constraint_builders_produce_expected_variants() {
        assert!(matches!(
            Constraint::boundary("見えねえ風景"),
            Constraint::Boundary(Pattern::Literal(_))
        ));

        let features = Constraint::features([("カレーパン", "名詞,一般,*,*,*,*,*")]);
        match features {
            Constraint::Features(pairs) => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].0, "カレーパン");
            }
            _ => panic!("expected feature constraint"),
        }
    }
}
