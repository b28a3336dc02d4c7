use crate::constants::{
    MECAB_BOS_NODE, MECAB_EON_NODE, MECAB_EOS_NODE, MECAB_NOR_NODE, MECAB_SYS_DIC, MECAB_UNK_DIC,
    MECAB_UNK_NODE, MECAB_USR_DIC,
};
use crate::native::{cstr_to_string, surface_to_string, MecabDictionaryInfoRaw, MecabNodeRaw};

/// Kind of a MeCab dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryKind {
    /// System dictionary.
    System,
    /// User-defined dictionary.
    User,
    /// Unknown-word dictionary.
    Unknown,
    /// A kind value this crate does not recognize.
    Other(i32),
}

impl From<i32> for DictionaryKind {
    fn from(value: i32) -> Self {
        match value {
            MECAB_SYS_DIC => DictionaryKind::System,
            MECAB_USR_DIC => DictionaryKind::User,
            MECAB_UNK_DIC => DictionaryKind::Unknown,
            other => DictionaryKind::Other(other),
        }
    }
}

/// Read-only snapshot of one `mecab_dictionary_info_t` entry.
///
/// The native linked list is walked exactly once when the analyzer is
/// constructed; the snapshot owns its strings and outlives no native
/// memory.
#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    /// Dictionary file path. Stored in UTF-8 on Windows.
    pub filename: String,
    /// Character set of the dictionary (for example `utf8`).
    pub charset: String,
    /// Number of words in the dictionary.
    pub size: u32,
    /// Dictionary kind.
    pub kind: DictionaryKind,
    /// Left-attribute size.
    pub lsize: u32,
    /// Right-attribute size.
    pub rsize: u32,
    /// Dictionary format version.
    pub version: u16,
}

impl DictionaryInfo {
    pub(crate) fn from_raw(raw: &MecabDictionaryInfoRaw) -> Self {
        Self {
            filename: cstr_to_string(raw.filename),
            charset: cstr_to_string(raw.charset),
            size: raw.size,
            kind: DictionaryKind::from(raw.kind),
            lsize: raw.lsize,
            rsize: raw.rsize,
            version: raw.version,
        }
    }

    /// Returns `true` for the system dictionary.
    pub fn is_system(&self) -> bool {
        self.kind == DictionaryKind::System
    }

    /// Returns `true` for a user dictionary.
    pub fn is_user(&self) -> bool {
        self.kind == DictionaryKind::User
    }

    /// Returns `true` for the unknown-word dictionary.
    pub fn is_unknown(&self) -> bool {
        self.kind == DictionaryKind::Unknown
    }
}

/// Status of a parsed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStat {
    /// Normal morpheme defined in the dictionary.
    Normal,
    /// Unknown morpheme not found in the dictionary.
    Unknown,
    /// Virtual begin-of-sentence node.
    Bos,
    /// Virtual end-of-sentence node.
    Eos,
    /// Virtual end-of-N-best-list node.
    Eon,
    /// A status value this crate does not recognize.
    Other(u8),
}

impl From<u8> for NodeStat {
    fn from(value: u8) -> Self {
        match value {
            MECAB_NOR_NODE => NodeStat::Normal,
            MECAB_UNK_NODE => NodeStat::Unknown,
            MECAB_BOS_NODE => NodeStat::Bos,
            MECAB_EOS_NODE => NodeStat::Eos,
            MECAB_EON_NODE => NodeStat::Eon,
            other => NodeStat::Other(other),
        }
    }
}

/// Owned snapshot of one `mecab_node_t` produced by node parsing.
///
/// The native node is a transient view into lattice memory, valid only
/// while its parse result is current; this type copies everything out so
/// results can outlive the call.
#[derive(Debug, Clone)]
pub struct MecabNode {
    /// Surface text consumed by this morpheme.
    ///
    /// Recomputed from the first `length` bytes of the raw surface
    /// pointer: the native pointer runs to the end of the sentence and
    /// skips the whitespace separators MeCab trims.
    pub surface: String,
    /// Feature annotation string; when a node or output format is
    /// configured, this carries the formatted rendering instead.
    pub feature: String,
    /// Unique node id.
    pub id: u32,
    /// Byte length of the surface form.
    pub length: u16,
    /// Byte length including the whitespace before the morpheme.
    pub rlength: u16,
    /// Right attribute id.
    pub rc_attr: u16,
    /// Left attribute id.
    pub lc_attr: u16,
    /// Part-of-speech id.
    pub posid: u16,
    /// Character type.
    pub char_type: u8,
    /// Node status.
    pub stat: NodeStat,
    /// Whether this node lies on the best path.
    pub is_best: bool,
    /// Forward log summation (marginal-probability mode only).
    pub alpha: f32,
    /// Backward log summation (marginal-probability mode only).
    pub beta: f32,
    /// Marginal probability (marginal-probability mode only).
    pub prob: f32,
    /// Word cost.
    pub wcost: i16,
    /// Best accumulative cost from the begin-of-sentence node.
    pub cost: i64,
}

impl MecabNode {
    pub(crate) fn from_raw(raw: &MecabNodeRaw) -> Self {
        Self {
            surface: surface_to_string(raw.surface, raw.length as usize),
            feature: cstr_to_string(raw.feature),
            id: raw.id,
            length: raw.length,
            rlength: raw.rlength,
            rc_attr: raw.rc_attr,
            lc_attr: raw.lc_attr,
            posid: raw.posid,
            char_type: raw.char_type,
            stat: NodeStat::from(raw.stat),
            is_best: raw.isbest != 0,
            alpha: raw.alpha,
            beta: raw.beta,
            prob: raw.prob,
            wcost: raw.wcost,
            cost: raw.cost as i64,
        }
    }

    /// Returns `true` for a normal dictionary morpheme.
    pub fn is_normal(&self) -> bool {
        self.stat == NodeStat::Normal
    }

    /// Returns `true` for an unknown morpheme.
    pub fn is_unknown(&self) -> bool {
        self.stat == NodeStat::Unknown
    }

    /// Returns `true` for the virtual begin-of-sentence node.
    pub fn is_bos(&self) -> bool {
        self.stat == NodeStat::Bos
    }

    /// Returns `true` for the virtual end-of-sentence node.
    pub fn is_eos(&self) -> bool {
        self.stat == NodeStat::Eos
    }

    /// Returns `true` for the virtual end-of-N-best-list node.
    pub fn is_eon(&self) -> bool {
        self.stat == NodeStat::Eon
    }
}

#[cfg(test)]
mod model_tests {
    use super::{DictionaryKind, NodeStat};

    #[test]
    fn dictionary_kind_maps_mecab_values() {
        assert_eq!(DictionaryKind::from(0), DictionaryKind::System);
        assert_eq!(DictionaryKind::from(1), DictionaryKind::User);
        assert_eq!(DictionaryKind::from(2), DictionaryKind::Unknown);
        assert_eq!(DictionaryKind::from(9), DictionaryKind::Other(9));
    }

    #[test]
    fn node_stat_maps_mecab_values() {
        assert_eq!(NodeStat::from(0), NodeStat::Normal);
        assert_eq!(NodeStat::from(1), NodeStat::Unknown);
        assert_eq!(NodeStat::from(2), NodeStat::Bos);
        assert_eq!(NodeStat::from(3), NodeStat::Eos);
        assert_eq!(NodeStat::from(4), NodeStat::Eon);
        assert_eq!(NodeStat::from(7), NodeStat::Other(7));
    }
}
