//! Constants mirrored from MeCab C API flag and enumeration values.

/// Lattice request type: retrieve only the single best path.
pub const MECAB_LATTICE_ONE_BEST: i32 = 1;
/// Lattice request type: retrieve N-best paths.
pub const MECAB_LATTICE_NBEST: i32 = 2;
/// Lattice request type: partial parsing mode.
pub const MECAB_LATTICE_PARTIAL: i32 = 4;
/// Lattice request type: compute marginal probabilities.
pub const MECAB_LATTICE_MARGINAL_PROB: i32 = 8;
/// Lattice request type: alternative analysis.
pub const MECAB_LATTICE_ALTERNATIVE: i32 = 16;
/// Lattice request type: output all morphemes.
pub const MECAB_LATTICE_ALL_MORPHS: i32 = 32;
/// Lattice request type: allocate new memory for the input sentence.
pub const MECAB_LATTICE_ALLOCATE_SENTENCE: i32 = 64;

/// Boundary constraint: any boundary is permitted at this byte position.
pub const MECAB_ANY_BOUNDARY: i32 = 0;
/// Boundary constraint: a token boundary is forced at this byte position.
pub const MECAB_TOKEN_BOUNDARY: i32 = 1;
/// Boundary constraint: this byte position lies inside an existing token.
pub const MECAB_INSIDE_TOKEN: i32 = 2;

/// Node status: normal node defined in the dictionary.
pub const MECAB_NOR_NODE: u8 = 0;
/// Node status: unknown node not defined in the dictionary.
pub const MECAB_UNK_NODE: u8 = 1;
/// Node status: virtual begin-of-sentence node.
pub const MECAB_BOS_NODE: u8 = 2;
/// Node status: virtual end-of-sentence node.
pub const MECAB_EOS_NODE: u8 = 3;
/// Node status: virtual end-of-N-best-list node.
pub const MECAB_EON_NODE: u8 = 4;

/// Dictionary type: system dictionary.
pub const MECAB_SYS_DIC: i32 = 0;
/// Dictionary type: user dictionary.
pub const MECAB_USR_DIC: i32 = 1;
/// Dictionary type: unknown-word dictionary.
pub const MECAB_UNK_DIC: i32 = 2;

/// Inclusive lower bound accepted for the `nbest` option.
pub const NBEST_MIN: i32 = 1;
/// Inclusive upper bound accepted for the `nbest` option.
pub const NBEST_MAX: i32 = 512;
