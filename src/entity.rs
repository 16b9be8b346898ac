//! Character reference tables and the escape/unescape routines.
//!
//! Entity names are stored without the leading `&` but with the trailing `;`
//! where the canonical form has one; the legacy names that may appear without
//! a semicolon are stored a second time without it. Expansions are at most
//! `1 + name.len()` bytes of UTF-8, which is what allows [`unescape`] to
//! rewrite its buffer in place.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Longest entity name that is valid without a trailing semicolon ("frac12").
pub(crate) const LONGEST_ENTITY_WITHOUT_SEMICOLON: usize = 6;

/// Replacements for the C1 control range 0x80..=0x9F in numeric character
/// references, per the Windows-1252 compatibility table.
static WINDOWS1252_REPLACEMENTS: [char; 32] = [
    '\u{20AC}', // 0x80 euro sign
    '\u{0081}', // 0x81
    '\u{201A}', // 0x82 single low-9 quotation mark
    '\u{0192}', // 0x83 latin small letter f with hook
    '\u{201E}', // 0x84 double low-9 quotation mark
    '\u{2026}', // 0x85 horizontal ellipsis
    '\u{2020}', // 0x86 dagger
    '\u{2021}', // 0x87 double dagger
    '\u{02C6}', // 0x88 modifier letter circumflex accent
    '\u{2030}', // 0x89 per mille sign
    '\u{0160}', // 0x8A latin capital letter s with caron
    '\u{2039}', // 0x8B single left-pointing angle quotation mark
    '\u{0152}', // 0x8C latin capital ligature oe
    '\u{008D}', // 0x8D
    '\u{017D}', // 0x8E latin capital letter z with caron
    '\u{008F}', // 0x8F
    '\u{0090}', // 0x90
    '\u{2018}', // 0x91 left single quotation mark
    '\u{2019}', // 0x92 right single quotation mark
    '\u{201C}', // 0x93 left double quotation mark
    '\u{201D}', // 0x94 right double quotation mark
    '\u{2022}', // 0x95 bullet
    '\u{2013}', // 0x96 en dash
    '\u{2014}', // 0x97 em dash
    '\u{02DC}', // 0x98 small tilde
    '\u{2122}', // 0x99 trade mark sign
    '\u{0161}', // 0x9A latin small letter s with caron
    '\u{203A}', // 0x9B single right-pointing angle quotation mark
    '\u{0153}', // 0x9C latin small ligature oe
    '\u{009D}', // 0x9D
    '\u{017E}', // 0x9E latin small letter z with caron
    '\u{0178}', // 0x9F latin capital letter y with diaeresis
];

/// Entities that expand to a single codepoint.
static ENTITY: &[(&str, char)] = &[
    // The legacy set that is valid without a trailing semicolon.
    ("AElig", '\u{C6}'),
    ("AMP", '\u{26}'),
    ("Aacute", '\u{C1}'),
    ("Acirc", '\u{C2}'),
    ("Agrave", '\u{C0}'),
    ("Aring", '\u{C5}'),
    ("Atilde", '\u{C3}'),
    ("Auml", '\u{C4}'),
    ("COPY", '\u{A9}'),
    ("Ccedil", '\u{C7}'),
    ("ETH", '\u{D0}'),
    ("Eacute", '\u{C9}'),
    ("Ecirc", '\u{CA}'),
    ("Egrave", '\u{C8}'),
    ("Euml", '\u{CB}'),
    ("GT", '\u{3E}'),
    ("Iacute", '\u{CD}'),
    ("Icirc", '\u{CE}'),
    ("Igrave", '\u{CC}'),
    ("Iuml", '\u{CF}'),
    ("LT", '\u{3C}'),
    ("Ntilde", '\u{D1}'),
    ("Oacute", '\u{D3}'),
    ("Ocirc", '\u{D4}'),
    ("Ograve", '\u{D2}'),
    ("Oslash", '\u{D8}'),
    ("Otilde", '\u{D5}'),
    ("Ouml", '\u{D6}'),
    ("QUOT", '\u{22}'),
    ("REG", '\u{AE}'),
    ("THORN", '\u{DE}'),
    ("Uacute", '\u{DA}'),
    ("Ucirc", '\u{DB}'),
    ("Ugrave", '\u{D9}'),
    ("Uuml", '\u{DC}'),
    ("Yacute", '\u{DD}'),
    ("aacute", '\u{E1}'),
    ("acirc", '\u{E2}'),
    ("acute", '\u{B4}'),
    ("aelig", '\u{E6}'),
    ("agrave", '\u{E0}'),
    ("amp", '\u{26}'),
    ("aring", '\u{E5}'),
    ("atilde", '\u{E3}'),
    ("auml", '\u{E4}'),
    ("brvbar", '\u{A6}'),
    ("ccedil", '\u{E7}'),
    ("cedil", '\u{B8}'),
    ("cent", '\u{A2}'),
    ("copy", '\u{A9}'),
    ("curren", '\u{A4}'),
    ("deg", '\u{B0}'),
    ("divide", '\u{F7}'),
    ("eacute", '\u{E9}'),
    ("ecirc", '\u{EA}'),
    ("egrave", '\u{E8}'),
    ("eth", '\u{F0}'),
    ("euml", '\u{EB}'),
    ("frac12", '\u{BD}'),
    ("frac14", '\u{BC}'),
    ("frac34", '\u{BE}'),
    ("gt", '\u{3E}'),
    ("iacute", '\u{ED}'),
    ("icirc", '\u{EE}'),
    ("iexcl", '\u{A1}'),
    ("igrave", '\u{EC}'),
    ("iquest", '\u{BF}'),
    ("iuml", '\u{EF}'),
    ("laquo", '\u{AB}'),
    ("lt", '\u{3C}'),
    ("macr", '\u{AF}'),
    ("micro", '\u{B5}'),
    ("middot", '\u{B7}'),
    ("nbsp", '\u{A0}'),
    ("not", '\u{AC}'),
    ("ntilde", '\u{F1}'),
    ("oacute", '\u{F3}'),
    ("ocirc", '\u{F4}'),
    ("ograve", '\u{F2}'),
    ("ordf", '\u{AA}'),
    ("ordm", '\u{BA}'),
    ("oslash", '\u{F8}'),
    ("otilde", '\u{F5}'),
    ("ouml", '\u{F6}'),
    ("para", '\u{B6}'),
    ("plusmn", '\u{B1}'),
    ("pound", '\u{A3}'),
    ("quot", '\u{22}'),
    ("raquo", '\u{BB}'),
    ("reg", '\u{AE}'),
    ("sect", '\u{A7}'),
    ("shy", '\u{AD}'),
    ("sup1", '\u{B9}'),
    ("sup2", '\u{B2}'),
    ("sup3", '\u{B3}'),
    ("szlig", '\u{DF}'),
    ("thorn", '\u{FE}'),
    ("times", '\u{D7}'),
    ("uacute", '\u{FA}'),
    ("ucirc", '\u{FB}'),
    ("ugrave", '\u{F9}'),
    ("uml", '\u{A8}'),
    ("uuml", '\u{FC}'),
    ("yacute", '\u{FD}'),
    ("yen", '\u{A5}'),
    ("yuml", '\u{FF}'),
    // Canonical semicolon-terminated forms.
    ("AElig;", '\u{C6}'),
    ("AMP;", '\u{26}'),
    ("Aacute;", '\u{C1}'),
    ("Acirc;", '\u{C2}'),
    ("Agrave;", '\u{C0}'),
    ("Alpha;", '\u{391}'),
    ("Aring;", '\u{C5}'),
    ("Atilde;", '\u{C3}'),
    ("Auml;", '\u{C4}'),
    ("Beta;", '\u{392}'),
    ("COPY;", '\u{A9}'),
    ("Ccedil;", '\u{C7}'),
    ("Chi;", '\u{3A7}'),
    ("Dagger;", '\u{2021}'),
    ("Delta;", '\u{394}'),
    ("ETH;", '\u{D0}'),
    ("Eacute;", '\u{C9}'),
    ("Ecirc;", '\u{CA}'),
    ("Egrave;", '\u{C8}'),
    ("Epsilon;", '\u{395}'),
    ("Eta;", '\u{397}'),
    ("Euml;", '\u{CB}'),
    ("GT;", '\u{3E}'),
    ("Gamma;", '\u{393}'),
    ("Iacute;", '\u{CD}'),
    ("Icirc;", '\u{CE}'),
    ("Igrave;", '\u{CC}'),
    ("Iota;", '\u{399}'),
    ("Iuml;", '\u{CF}'),
    ("Kappa;", '\u{39A}'),
    ("LT;", '\u{3C}'),
    ("Lambda;", '\u{39B}'),
    ("Mu;", '\u{39C}'),
    ("Ntilde;", '\u{D1}'),
    ("Nu;", '\u{39D}'),
    ("OElig;", '\u{152}'),
    ("Oacute;", '\u{D3}'),
    ("Ocirc;", '\u{D4}'),
    ("Ograve;", '\u{D2}'),
    ("Omega;", '\u{3A9}'),
    ("Omicron;", '\u{39F}'),
    ("Oslash;", '\u{D8}'),
    ("Otilde;", '\u{D5}'),
    ("Ouml;", '\u{D6}'),
    ("Phi;", '\u{3A6}'),
    ("Pi;", '\u{3A0}'),
    ("Prime;", '\u{2033}'),
    ("Psi;", '\u{3A8}'),
    ("QUOT;", '\u{22}'),
    ("REG;", '\u{AE}'),
    ("Rho;", '\u{3A1}'),
    ("Scaron;", '\u{160}'),
    ("Sigma;", '\u{3A3}'),
    ("THORN;", '\u{DE}'),
    ("Tau;", '\u{3A4}'),
    ("Theta;", '\u{398}'),
    ("Uacute;", '\u{DA}'),
    ("Ucirc;", '\u{DB}'),
    ("Ugrave;", '\u{D9}'),
    ("Upsilon;", '\u{3A5}'),
    ("Uuml;", '\u{DC}'),
    ("Xi;", '\u{39E}'),
    ("Yacute;", '\u{DD}'),
    ("Yuml;", '\u{178}'),
    ("Zeta;", '\u{396}'),
    ("aacute;", '\u{E1}'),
    ("acirc;", '\u{E2}'),
    ("acute;", '\u{B4}'),
    ("aelig;", '\u{E6}'),
    ("agrave;", '\u{E0}'),
    ("alefsym;", '\u{2135}'),
    ("alpha;", '\u{3B1}'),
    ("amp;", '\u{26}'),
    ("and;", '\u{2227}'),
    ("ang;", '\u{2220}'),
    ("apos;", '\u{27}'),
    ("aring;", '\u{E5}'),
    ("asymp;", '\u{2248}'),
    ("atilde;", '\u{E3}'),
    ("auml;", '\u{E4}'),
    ("bdquo;", '\u{201E}'),
    ("beta;", '\u{3B2}'),
    ("brvbar;", '\u{A6}'),
    ("bull;", '\u{2022}'),
    ("cap;", '\u{2229}'),
    ("ccedil;", '\u{E7}'),
    ("cedil;", '\u{B8}'),
    ("cent;", '\u{A2}'),
    ("chi;", '\u{3C7}'),
    ("circ;", '\u{2C6}'),
    ("clubs;", '\u{2663}'),
    ("cong;", '\u{2245}'),
    ("copy;", '\u{A9}'),
    ("crarr;", '\u{21B5}'),
    ("cup;", '\u{222A}'),
    ("curren;", '\u{A4}'),
    ("dArr;", '\u{21D3}'),
    ("dagger;", '\u{2020}'),
    ("darr;", '\u{2193}'),
    ("deg;", '\u{B0}'),
    ("delta;", '\u{3B4}'),
    ("diams;", '\u{2666}'),
    ("divide;", '\u{F7}'),
    ("eacute;", '\u{E9}'),
    ("ecirc;", '\u{EA}'),
    ("egrave;", '\u{E8}'),
    ("empty;", '\u{2205}'),
    ("emsp;", '\u{2003}'),
    ("ensp;", '\u{2002}'),
    ("epsilon;", '\u{3B5}'),
    ("equiv;", '\u{2261}'),
    ("eta;", '\u{3B7}'),
    ("eth;", '\u{F0}'),
    ("euml;", '\u{EB}'),
    ("euro;", '\u{20AC}'),
    ("exist;", '\u{2203}'),
    ("fnof;", '\u{192}'),
    ("forall;", '\u{2200}'),
    ("frac12;", '\u{BD}'),
    ("frac14;", '\u{BC}'),
    ("frac34;", '\u{BE}'),
    ("frasl;", '\u{2044}'),
    ("gamma;", '\u{3B3}'),
    ("ge;", '\u{2265}'),
    ("gt;", '\u{3E}'),
    ("hArr;", '\u{21D4}'),
    ("harr;", '\u{2194}'),
    ("hearts;", '\u{2665}'),
    ("hellip;", '\u{2026}'),
    ("iacute;", '\u{ED}'),
    ("icirc;", '\u{EE}'),
    ("iexcl;", '\u{A1}'),
    ("igrave;", '\u{EC}'),
    ("image;", '\u{2111}'),
    ("infin;", '\u{221E}'),
    ("int;", '\u{222B}'),
    ("iota;", '\u{3B9}'),
    ("iquest;", '\u{BF}'),
    ("isin;", '\u{2208}'),
    ("iuml;", '\u{EF}'),
    ("kappa;", '\u{3BA}'),
    ("lArr;", '\u{21D0}'),
    ("lambda;", '\u{3BB}'),
    ("lang;", '\u{27E8}'),
    ("laquo;", '\u{AB}'),
    ("larr;", '\u{2190}'),
    ("lceil;", '\u{2308}'),
    ("ldquo;", '\u{201C}'),
    ("le;", '\u{2264}'),
    ("lfloor;", '\u{230A}'),
    ("lowast;", '\u{2217}'),
    ("loz;", '\u{25CA}'),
    ("lrm;", '\u{200E}'),
    ("lsaquo;", '\u{2039}'),
    ("lsquo;", '\u{2018}'),
    ("lt;", '\u{3C}'),
    ("macr;", '\u{AF}'),
    ("mdash;", '\u{2014}'),
    ("micro;", '\u{B5}'),
    ("middot;", '\u{B7}'),
    ("minus;", '\u{2212}'),
    ("mu;", '\u{3BC}'),
    ("nabla;", '\u{2207}'),
    ("nbsp;", '\u{A0}'),
    ("ndash;", '\u{2013}'),
    ("ne;", '\u{2260}'),
    ("ni;", '\u{220B}'),
    ("not;", '\u{AC}'),
    ("notin;", '\u{2209}'),
    ("nsub;", '\u{2284}'),
    ("ntilde;", '\u{F1}'),
    ("nu;", '\u{3BD}'),
    ("oacute;", '\u{F3}'),
    ("ocirc;", '\u{F4}'),
    ("oelig;", '\u{153}'),
    ("ograve;", '\u{F2}'),
    ("oline;", '\u{203E}'),
    ("omega;", '\u{3C9}'),
    ("omicron;", '\u{3BF}'),
    ("oplus;", '\u{2295}'),
    ("or;", '\u{2228}'),
    ("ordf;", '\u{AA}'),
    ("ordm;", '\u{BA}'),
    ("oslash;", '\u{F8}'),
    ("otilde;", '\u{F5}'),
    ("otimes;", '\u{2297}'),
    ("ouml;", '\u{F6}'),
    ("para;", '\u{B6}'),
    ("part;", '\u{2202}'),
    ("permil;", '\u{2030}'),
    ("perp;", '\u{22A5}'),
    ("phi;", '\u{3C6}'),
    ("pi;", '\u{3C0}'),
    ("piv;", '\u{3D6}'),
    ("plusmn;", '\u{B1}'),
    ("pound;", '\u{A3}'),
    ("prime;", '\u{2032}'),
    ("prod;", '\u{220F}'),
    ("prop;", '\u{221D}'),
    ("psi;", '\u{3C8}'),
    ("quot;", '\u{22}'),
    ("rArr;", '\u{21D2}'),
    ("radic;", '\u{221A}'),
    ("rang;", '\u{27E9}'),
    ("raquo;", '\u{BB}'),
    ("rarr;", '\u{2192}'),
    ("rceil;", '\u{2309}'),
    ("rdquo;", '\u{201D}'),
    ("real;", '\u{211C}'),
    ("reg;", '\u{AE}'),
    ("rfloor;", '\u{230B}'),
    ("rho;", '\u{3C1}'),
    ("rlm;", '\u{200F}'),
    ("rsaquo;", '\u{203A}'),
    ("rsquo;", '\u{2019}'),
    ("sbquo;", '\u{201A}'),
    ("scaron;", '\u{161}'),
    ("sdot;", '\u{22C5}'),
    ("sect;", '\u{A7}'),
    ("shy;", '\u{AD}'),
    ("sigma;", '\u{3C3}'),
    ("sigmaf;", '\u{3C2}'),
    ("sim;", '\u{223C}'),
    ("spades;", '\u{2660}'),
    ("sub;", '\u{2282}'),
    ("sube;", '\u{2286}'),
    ("sum;", '\u{2211}'),
    ("sup1;", '\u{B9}'),
    ("sup2;", '\u{B2}'),
    ("sup3;", '\u{B3}'),
    ("sup;", '\u{2283}'),
    ("supe;", '\u{2287}'),
    ("szlig;", '\u{DF}'),
    ("tau;", '\u{3C4}'),
    ("there4;", '\u{2234}'),
    ("theta;", '\u{3B8}'),
    ("thetasym;", '\u{3D1}'),
    ("thinsp;", '\u{2009}'),
    ("thorn;", '\u{FE}'),
    ("tilde;", '\u{2DC}'),
    ("times;", '\u{D7}'),
    ("trade;", '\u{2122}'),
    ("uArr;", '\u{21D1}'),
    ("uacute;", '\u{FA}'),
    ("uarr;", '\u{2191}'),
    ("ucirc;", '\u{FB}'),
    ("ugrave;", '\u{F9}'),
    ("uml;", '\u{A8}'),
    ("upsih;", '\u{3D2}'),
    ("upsilon;", '\u{3C5}'),
    ("uuml;", '\u{FC}'),
    ("weierp;", '\u{2118}'),
    ("xi;", '\u{3BE}'),
    ("yacute;", '\u{FD}'),
    ("yen;", '\u{A5}'),
    ("yuml;", '\u{FF}'),
    ("zeta;", '\u{3B6}'),
    ("zwj;", '\u{200D}'),
    ("zwnj;", '\u{200C}'),
];

/// Entities that expand to two codepoints.
static ENTITY2: &[(&str, [char; 2])] = &[
    ("NotEqualTilde;", ['\u{2242}', '\u{338}']),
    ("NotGreaterFullEqual;", ['\u{2267}', '\u{338}']),
    ("NotGreaterGreater;", ['\u{226B}', '\u{338}']),
    ("NotGreaterSlantEqual;", ['\u{2A7E}', '\u{338}']),
    ("NotHumpDownHump;", ['\u{224E}', '\u{338}']),
    ("NotHumpEqual;", ['\u{224F}', '\u{338}']),
    ("NotLeftTriangleBar;", ['\u{29CF}', '\u{338}']),
    ("NotLessLess;", ['\u{226A}', '\u{338}']),
    ("NotLessSlantEqual;", ['\u{2A7D}', '\u{338}']),
    ("NotNestedGreaterGreater;", ['\u{2AA2}', '\u{338}']),
    ("NotNestedLessLess;", ['\u{2AA1}', '\u{338}']),
    ("NotPrecedesEqual;", ['\u{2AAF}', '\u{338}']),
    ("NotRightTriangleBar;", ['\u{29D0}', '\u{338}']),
    ("NotSquareSubset;", ['\u{228F}', '\u{338}']),
    ("NotSquareSuperset;", ['\u{2290}', '\u{338}']),
    ("NotSucceedsEqual;", ['\u{2AB0}', '\u{338}']),
    ("NotSucceedsTilde;", ['\u{227F}', '\u{338}']),
    ("ThickSpace;", ['\u{205F}', '\u{200A}']),
    ("acE;", ['\u{223E}', '\u{333}']),
    ("bne;", ['\u{3D}', '\u{20E5}']),
    ("bnequiv;", ['\u{2261}', '\u{20E5}']),
    ("caps;", ['\u{2229}', '\u{FE00}']),
    ("cups;", ['\u{222A}', '\u{FE00}']),
    ("fjlig;", ['\u{66}', '\u{6A}']),
    ("gesl;", ['\u{22DB}', '\u{FE00}']),
    ("gvertneqq;", ['\u{2269}', '\u{FE00}']),
    ("lates;", ['\u{2AAD}', '\u{FE00}']),
    ("lesg;", ['\u{22DA}', '\u{FE00}']),
    ("lvertneqq;", ['\u{2268}', '\u{FE00}']),
    ("nGg;", ['\u{22D9}', '\u{338}']),
    ("nGtv;", ['\u{226B}', '\u{338}']),
    ("nLl;", ['\u{22D8}', '\u{338}']),
    ("nLtv;", ['\u{226A}', '\u{338}']),
    ("nang;", ['\u{2220}', '\u{20D2}']),
    ("napE;", ['\u{2A70}', '\u{338}']),
    ("napid;", ['\u{224B}', '\u{338}']),
    ("nbump;", ['\u{224E}', '\u{338}']),
    ("nbumpe;", ['\u{224F}', '\u{338}']),
    ("ncongdot;", ['\u{2A6D}', '\u{338}']),
    ("nedot;", ['\u{2250}', '\u{338}']),
    ("nesim;", ['\u{2242}', '\u{338}']),
    ("ngeqq;", ['\u{2267}', '\u{338}']),
    ("ngeqslant;", ['\u{2A7E}', '\u{338}']),
    ("nleqq;", ['\u{2266}', '\u{338}']),
    ("nleqslant;", ['\u{2A7D}', '\u{338}']),
    ("notinE;", ['\u{22F9}', '\u{338}']),
    ("notindot;", ['\u{22F5}', '\u{338}']),
    ("npart;", ['\u{2202}', '\u{338}']),
    ("npre;", ['\u{2AAF}', '\u{338}']),
    ("nrarrc;", ['\u{2933}', '\u{338}']),
    ("nrarrw;", ['\u{219D}', '\u{338}']),
    ("nsce;", ['\u{2AB0}', '\u{338}']),
    ("nsubE;", ['\u{2AC5}', '\u{338}']),
    ("nsupE;", ['\u{2AC6}', '\u{338}']),
    ("nvap;", ['\u{224D}', '\u{20D2}']),
    ("nvge;", ['\u{2265}', '\u{20D2}']),
    ("nvgt;", ['\u{3E}', '\u{20D2}']),
    ("nvle;", ['\u{2264}', '\u{20D2}']),
    ("nvlt;", ['\u{3C}', '\u{20D2}']),
    ("nvltrie;", ['\u{22B4}', '\u{20D2}']),
    ("nvrtrie;", ['\u{22B5}', '\u{20D2}']),
    ("nvsim;", ['\u{223C}', '\u{20D2}']),
    ("race;", ['\u{223D}', '\u{331}']),
    ("smtes;", ['\u{2AAC}', '\u{FE00}']),
    ("sqcaps;", ['\u{2293}', '\u{FE00}']),
    ("sqcups;", ['\u{2294}', '\u{FE00}']),
    ("varsubsetneq;", ['\u{228A}', '\u{FE00}']),
    ("varsubsetneqq;", ['\u{2ACB}', '\u{FE00}']),
    ("varsupsetneq;", ['\u{228B}', '\u{FE00}']),
    ("varsupsetneqq;", ['\u{2ACC}', '\u{FE00}']),
    ("vnsub;", ['\u{2282}', '\u{20D2}']),
    ("vnsup;", ['\u{2283}', '\u{20D2}']),
    ("vsubnE;", ['\u{2ACB}', '\u{FE00}']),
    ("vsubne;", ['\u{228A}', '\u{FE00}']),
    ("vsupnE;", ['\u{2ACC}', '\u{FE00}']),
    ("vsupne;", ['\u{228B}', '\u{FE00}']),
];

lazy_static! {
    static ref ENTITY_MAP: HashMap<&'static str, char> = ENTITY.iter().copied().collect();
    static ref ENTITY2_MAP: HashMap<&'static str, [char; 2]> = ENTITY2.iter().copied().collect();
}

/// Returns true for codepoints that numeric references must not produce and
/// that get replaced with U+FFFD.
fn disallowed_codepoint(x: u32) -> bool {
    match x {
        0 => true,
        0x01..=0x08 | 0x0B | 0x0D..=0x1F => true, // C0 controls except TAB, LF, FF
        0x7F => true,
        0xD800..=0xDFFF => true, // surrogates
        0xFDD0..=0xFDEF => true,
        x if x > 0x10FFFF => true,
        x if x & 0xFFFE == 0xFFFE => true, // noncharacters U+xFFFE / U+xFFFF
        _ => false,
    }
}

fn write_char(b: &mut [u8], dst: usize, c: char) -> usize {
    dst + c.encode_utf8(&mut b[dst..]).len()
}

/// Reads a character reference starting at `b[src]` (which holds `&`) and
/// writes its expansion at `b[dst]`. Returns the new `(dst, src)` pair. The
/// expansion never outgrows the consumed bytes, so `dst <= src` is preserved.
fn unescape_entity(b: &mut [u8], dst: usize, src: usize, attribute: bool) -> (usize, usize) {
    let s = src;
    let n = b.len() - s;
    if n <= 1 {
        b[dst] = b[src];
        return (dst + 1, src + 1);
    }

    if b[s + 1] == b'#' {
        if n <= 3 {
            // We need at least "&#." to have a digit to look at.
            b[dst] = b[src];
            return (dst + 1, src + 1);
        }
        let mut i = 2;
        let mut hex = false;
        if b[s + i] == b'x' || b[s + i] == b'X' {
            hex = true;
            i += 1;
        }

        let digits_start = i;
        let mut x: u32 = 0;
        while s + i < b.len() {
            let c = b[s + i];
            i += 1;
            if hex {
                if let Some(d) = (c as char).to_digit(16) {
                    x = x.saturating_mul(16).saturating_add(d);
                    continue;
                }
            } else if let Some(d) = (c as char).to_digit(10) {
                x = x.saturating_mul(10).saturating_add(d);
                continue;
            }
            if c != b';' {
                i -= 1;
            }
            break;
        }

        if i == digits_start || (i == digits_start + 1 && b[s + digits_start] == b';') {
            // No digits matched.
            b[dst] = b[src];
            return (dst + 1, src + 1);
        }

        let c = if (0x80..=0x9F).contains(&x) {
            WINDOWS1252_REPLACEMENTS[(x - 0x80) as usize]
        } else if disallowed_codepoint(x) {
            '\u{FFFD}'
        } else {
            char::from_u32(x).unwrap_or('\u{FFFD}')
        };
        return (write_char(b, dst, c), src + i);
    }

    // Consume the maximum run of characters that could form an entity name.
    let mut i = 1;
    while s + i < b.len() {
        let c = b[s + i];
        i += 1;
        if c.is_ascii_alphanumeric() {
            continue;
        }
        if c != b';' {
            i -= 1;
        }
        break;
    }

    let name_end = s + i;
    let name = std::str::from_utf8(&b[s + 1..name_end]).unwrap_or("");
    let has_semicolon = name.ends_with(';');

    if name.is_empty() {
        // No-op.
    } else if attribute && !has_semicolon && name_end < b.len() && b[name_end] == b'=' {
        // A legacy "&name=" in an attribute is left alone (think query strings).
    } else if let Some(&c) = ENTITY_MAP.get(name) {
        return (write_char(b, dst, c), src + i);
    } else if let Some(&[c0, c1]) = ENTITY2_MAP.get(name) {
        let dst1 = write_char(b, dst, c0);
        return (write_char(b, dst1, c1), src + i);
    } else if !attribute {
        // Longest-prefix fallback for the legacy semicolon-less names.
        let limit = (name.len().saturating_sub(1)).min(LONGEST_ENTITY_WITHOUT_SEMICOLON);
        for max_len in (2..=limit).rev() {
            if let Some(&c) = ENTITY_MAP.get(&name[..max_len]) {
                return (write_char(b, dst, c), src + max_len + 1);
            }
        }
    }

    let (dst1, src1) = (dst + i, src + i);
    b.copy_within(src..src1, dst);
    (dst1, src1)
}

/// Unescapes character references in `b` in place and returns the truncated
/// length. `attribute` selects the attribute-value matching rule that leaves
/// legacy `&name=` sequences alone.
pub(crate) fn unescape_in_place(b: &mut [u8], attribute: bool) -> usize {
    let Some(amp) = b.iter().position(|&c| c == b'&') else {
        return b.len();
    };

    let (mut dst, mut src) = unescape_entity(b, amp, amp, attribute);
    while src < b.len() {
        if b[src] == b'&' {
            let (d, s) = unescape_entity(b, dst, src, attribute);
            dst = d;
            src = s;
        } else {
            b[dst] = b[src];
            dst += 1;
            src += 1;
        }
    }
    dst
}

/// Unescapes character references in `s`, for example `&lt;` to `<`.
pub fn unescape_string(s: &str) -> String {
    let mut b = s.as_bytes().to_vec();
    let n = unescape_in_place(&mut b, false);
    b.truncate(n);
    String::from_utf8(b).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

const ESCAPED_CHARS: &[char] = &['&', '\'', '<', '>', '"', '\r'];

/// Escapes the characters `& ' < > " \r` so that the result re-parses to `s`.
/// The output is at most six times the length of the input.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

pub(crate) fn escape_into(out: &mut String, s: &str) {
    let mut rest = s;
    while let Some(i) = rest.find(ESCAPED_CHARS) {
        out.push_str(&rest[..i]);
        let c = rest.as_bytes()[i];
        out.push_str(match c {
            b'&' => "&amp;",
            b'\'' => "&#39;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&#34;",
            _ => "&#13;",
        });
        rest = &rest[i + 1..];
    }
    out.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(s: &str) -> String {
        unescape_string(s)
    }

    fn unescape_attr(s: &str) -> String {
        let mut b = s.as_bytes().to_vec();
        let n = unescape_in_place(&mut b, true);
        b.truncate(n);
        String::from_utf8(b).expect("valid utf8")
    }

    macro_rules! unescape_tests {
        ($($name:ident : $value:expr)*) => {
            $(
                #[test]
                fn $name() {
                    let (input, expected) = $value;
                    assert_eq!(unescape(input), expected);
                }
            )*
        }
    }

    unescape_tests! {
        plain: ("no entities here", "no entities here")
        named: ("&amp;&lt;&gt;", "&<>")
        legacy_no_semicolon: ("&amp&lt&gt", "&<>")
        longest_prefix: ("&notit;&notin;", "\u{AC}it;\u{2209}")
        unknown_passthrough: ("&nosuchentity;", "&nosuchentity;")
        bare_ampersand: ("a & b", "a & b")
        trailing_ampersand: ("a&", "a&")
        numeric_decimal: ("&#65;&#66;", "AB")
        numeric_hex: ("&#x41;&#X42;", "AB")
        numeric_no_semicolon: ("&#65 ok", "A ok")
        numeric_win1252: ("&#128;&#153;", "\u{20AC}\u{2122}")
        numeric_nul: ("&#0;", "\u{FFFD}")
        numeric_surrogate: ("&#xD800;", "\u{FFFD}")
        numeric_too_big: ("&#x110000;", "\u{FFFD}")
        numeric_noncharacter: ("&#xFDD0;&#xFFFE;", "\u{FFFD}\u{FFFD}")
        numeric_control: ("&#1;", "\u{FFFD}")
        numeric_empty: ("&#;", "&#;")
        two_codepoint: ("&NotEqualTilde;", "\u{2242}\u{338}")
        fj_ligature: ("&fjlig;", "fj")
    }

    #[test]
    fn attribute_mode_keeps_legacy_query_strings() {
        assert_eq!(
            unescape_attr("q=z&amp=5&notice=hello&not;=world"),
            "q=z&amp=5&notice=hello\u{AC}=world"
        );
    }

    #[test]
    fn attribute_mode_still_matches_semicolon_forms() {
        assert_eq!(unescape_attr("&amp;=5"), "&=5");
    }

    #[test]
    fn escape_round_trip() {
        let cases = [
            "",
            "plain text",
            "&<>'\"\r",
            "a&b<c>d'e\"f\rg",
            "unicode \u{2603} stays",
        ];
        for s in cases {
            assert_eq!(unescape_string(&escape_string(s)), s, "{s:?}");
        }
    }

    #[test]
    fn escape_growth_bound() {
        for s in ["&&&&", "'\"<>\r&", "xyz"] {
            assert!(escape_string(s).len() <= 6 * s.len().max(1));
        }
    }

    #[test]
    fn entity_lengths_allow_in_place_rewrite() {
        // The +1 accounts for the leading '&' that every reference consumes.
        for (k, v) in ENTITY {
            assert!(1 + k.len() >= v.len_utf8(), "entity {k}");
        }
        for (k, [v0, v1]) in ENTITY2 {
            assert!(1 + k.len() >= v0.len_utf8() + v1.len_utf8(), "entity {k}");
        }
    }

    #[test]
    fn no_semicolon_entities_within_declared_bound() {
        for (k, _) in ENTITY {
            if !k.ends_with(';') {
                assert!(k.len() <= LONGEST_ENTITY_WITHOUT_SEMICOLON, "entity {k}");
            }
        }
    }
}
