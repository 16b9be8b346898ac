//! Interned names for the known HTML tags and attributes.
//!
//! An [`Atom`] packs `(offset << 8) | length` into one static string of all
//! known names, so equality checks on tag names become integer compares and the
//! original string can be recovered by slicing. The zero atom means "not a
//! known name". Lookup is case-sensitive and goes through a dual-hashed
//! open-addressed table: a single FNV-1a hash provides two candidate slots
//! (its low and high 16 bits), and a name not found in either slot is not in
//! the table.

/// A 32-bit code for a known HTML tag or attribute name. Zero is "unknown".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

impl Atom {
    /// Looks up the atom for the given name. Returns the zero atom when the
    /// name is not a known HTML name (lookup is case-sensitive).
    pub fn lookup(name: &[u8]) -> Atom {
        if name.is_empty() || name.len() > MAX_ATOM_LEN {
            return Atom(0);
        }

        let mask = (ATOM_TABLE.len() - 1) as u32;
        let h = fnv(HASH0, name);

        let a = ATOM_TABLE[(h & mask) as usize];
        if a.len() == name.len() && a.as_str().as_bytes() == name {
            return a;
        }
        let a = ATOM_TABLE[((h >> 16) & mask) as usize];
        if a.len() == name.len() && a.as_str().as_bytes() == name {
            return a;
        }

        Atom(0)
    }

    /// The name this atom stands for, or the empty string for the zero atom.
    pub fn as_str(self) -> &'static str {
        let start = (self.0 >> 8) as usize;
        &ATOM_TEXT[start..start + self.len()]
    }

    /// Length in bytes of the interned name.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> usize {
        (self.0 & 0xFF) as usize
    }

    /// Returns true for the zero ("not a known name") atom.
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// FNV-1a over `name`, starting from seed `h`.
fn fnv(mut h: u32, name: &[u8]) -> u32 {
    for &b in name {
        h ^= u32::from(b);
        h = h.wrapping_mul(16_777_619);
    }
    h
}

// Known HTML tag and attribute names, interned as 32-bit atom codes.
// The table below is generated; do not edit by hand.

pub const A: Atom = Atom(0x000001); // a
pub const ABBR: Atom = Atom(0x04A904); // abbr
pub const ACCEPT: Atom = Atom(0x003106); // accept
pub const ACCEPT_CHARSET: Atom = Atom(0x00310E); // accept-charset
pub const ACCESSKEY: Atom = Atom(0x015D09); // accesskey
pub const ACTION: Atom = Atom(0x010706); // action
pub const ADDRESS: Atom = Atom(0x02C007); // address
pub const ALLOWFULLSCREEN: Atom = Atom(0x00130F); // allowfullscreen
pub const ALLOWPAYMENTREQUEST: Atom = Atom(0x000013); // allowpaymentrequest
pub const ALLOWUSERMEDIA: Atom = Atom(0x003F0E); // allowusermedia
pub const ALT: Atom = Atom(0x04FD03); // alt
pub const ANNOTATION_XML: Atom = Atom(0x004D0E); // annotation-xml
pub const APPLET: Atom = Atom(0x036F06); // applet
pub const AREA: Atom = Atom(0x02BC04); // area
pub const ARTICLE: Atom = Atom(0x02C707); // article
pub const AS: Atom = Atom(0x01C902); // as
pub const ASIDE: Atom = Atom(0x041D05); // aside
pub const ASYNC: Atom = Atom(0x042205); // async
pub const AUDIO: Atom = Atom(0x042705); // audio
pub const AUTOCOMPLETE: Atom = Atom(0x00AC0C); // autocomplete
pub const AUTOFOCUS: Atom = Atom(0x016609); // autofocus
pub const AUTOPLAY: Atom = Atom(0x01C008); // autoplay
pub const B: Atom = Atom(0x002E01); // b
pub const BASE: Atom = Atom(0x01C804); // base
pub const BASEFONT: Atom = Atom(0x01C808); // basefont
pub const BDI: Atom = Atom(0x050003); // bdi
pub const BDO: Atom = Atom(0x050303); // bdo
pub const BGSOUND: Atom = Atom(0x02CE07); // bgsound
pub const BIG: Atom = Atom(0x050603); // big
pub const BLINK: Atom = Atom(0x042C05); // blink
pub const BLOCKQUOTE: Atom = Atom(0x00EF0A); // blockquote
pub const BODY: Atom = Atom(0x048204); // body
pub const BR: Atom = Atom(0x04AB02); // br
pub const BUTTON: Atom = Atom(0x037506); // button
pub const CANVAS: Atom = Atom(0x037B06); // canvas
pub const CAPTION: Atom = Atom(0x00FC07); // caption
pub const CENTER: Atom = Atom(0x038106); // center
pub const CHALLENGE: Atom = Atom(0x016F09); // challenge
pub const CHARSET: Atom = Atom(0x003807); // charset
pub const CHECKED: Atom = Atom(0x02D507); // checked
pub const CITE: Atom = Atom(0x04AD04); // cite
pub const CLASS: Atom = Atom(0x043105); // class
pub const CODE: Atom = Atom(0x04B104); // code
pub const COL: Atom = Atom(0x01D003); // col
pub const COLGROUP: Atom = Atom(0x01D008); // colgroup
pub const COLOR: Atom = Atom(0x043605); // color
pub const COLS: Atom = Atom(0x02DC04); // cols
pub const COLSPAN: Atom = Atom(0x02DC07); // colspan
pub const COMMAND: Atom = Atom(0x02E307); // command
pub const CONTENT: Atom = Atom(0x002207); // content
pub const CONTENTEDITABLE: Atom = Atom(0x00220F); // contenteditable
pub const CONTEXTMENU: Atom = Atom(0x00B80B); // contextmenu
pub const CONTROLS: Atom = Atom(0x01D808); // controls
pub const COORDS: Atom = Atom(0x038706); // coords
pub const CROSSORIGIN: Atom = Atom(0x00C30B); // crossorigin
pub const DATA: Atom = Atom(0x01E004); // data
pub const DATALIST: Atom = Atom(0x01E008); // datalist
pub const DATETIME: Atom = Atom(0x01E808); // datetime
pub const DD: Atom = Atom(0x01F702); // dd
pub const DEFAULT: Atom = Atom(0x02EA07); // default
pub const DEFER: Atom = Atom(0x043B05); // defer
pub const DEL: Atom = Atom(0x050903); // del
pub const DESC: Atom = Atom(0x04B504); // desc
pub const DETAILS: Atom = Atom(0x02F107); // details
pub const DFN: Atom = Atom(0x050C03); // dfn
pub const DIALOG: Atom = Atom(0x038D06); // dialog
pub const DIR: Atom = Atom(0x02F803); // dir
pub const DIRNAME: Atom = Atom(0x02F807); // dirname
pub const DISABLED: Atom = Atom(0x01F008); // disabled
pub const DIV: Atom = Atom(0x050F03); // div
pub const DL: Atom = Atom(0x04CC02); // dl
pub const DOWNLOAD: Atom = Atom(0x01F808); // download
pub const DRAGGABLE: Atom = Atom(0x017809); // draggable
pub const DROPZONE: Atom = Atom(0x020008); // dropzone
pub const DT: Atom = Atom(0x048F02); // dt
pub const EM: Atom = Atom(0x00A202); // em
pub const EMBED: Atom = Atom(0x032B05); // embed
pub const ENCODING: Atom = Atom(0x020808); // encoding
pub const ENCTYPE: Atom = Atom(0x00D207); // enctype
pub const FACE: Atom = Atom(0x04B904); // face
pub const FIELDSET: Atom = Atom(0x021008); // fieldset
pub const FIGCAPTION: Atom = Atom(0x00F90A); // figcaption
pub const FIGURE: Atom = Atom(0x039306); // figure
pub const FONT: Atom = Atom(0x01CC04); // font
pub const FOOTER: Atom = Atom(0x039906); // footer
pub const FOR: Atom = Atom(0x005B03); // for
pub const FOREIGN_OBJECT: Atom = Atom(0x00850D); // foreignObject
pub const FOREIGNOBJECT: Atom = Atom(0x00920D); // foreignobject
pub const FORM: Atom = Atom(0x005B04); // form
pub const FORMACTION: Atom = Atom(0x01030A); // formaction
pub const FORMENCTYPE: Atom = Atom(0x00CE0B); // formenctype
pub const FORMMETHOD: Atom = Atom(0x010D0A); // formmethod
pub const FORMNOVALIDATE: Atom = Atom(0x005B0E); // formnovalidate
pub const FORMTARGET: Atom = Atom(0x01170A); // formtarget
pub const FRAME: Atom = Atom(0x021805); // frame
pub const FRAMESET: Atom = Atom(0x021808); // frameset
pub const H1: Atom = Atom(0x053302); // h1
pub const H2: Atom = Atom(0x053502); // h2
pub const H3: Atom = Atom(0x053702); // h3
pub const H4: Atom = Atom(0x053902); // h4
pub const H5: Atom = Atom(0x053B02); // h5
pub const H6: Atom = Atom(0x053D02); // h6
pub const HEAD: Atom = Atom(0x02FF04); // head
pub const HEADER: Atom = Atom(0x02FF06); // header
pub const HEADERS: Atom = Atom(0x02FF07); // headers
pub const HEIGHT: Atom = Atom(0x039F06); // height
pub const HGROUP: Atom = Atom(0x03A506); // hgroup
pub const HIDDEN: Atom = Atom(0x03AB06); // hidden
pub const HIGH: Atom = Atom(0x04BD04); // high
pub const HR: Atom = Atom(0x022002); // hr
pub const HREF: Atom = Atom(0x022004); // href
pub const HREFLANG: Atom = Atom(0x022008); // hreflang
pub const HTML: Atom = Atom(0x04C104); // html
pub const HTTP_EQUIV: Atom = Atom(0x01210A); // http-equiv
pub const I: Atom = Atom(0x002B01); // i
pub const ICON: Atom = Atom(0x04C504); // icon
pub const ID: Atom = Atom(0x006402); // id
pub const IFRAME: Atom = Atom(0x03B106); // iframe
pub const IMAGE: Atom = Atom(0x044005); // image
pub const IMG: Atom = Atom(0x051203); // img
pub const INPUT: Atom = Atom(0x018105); // input
pub const INPUTMODE: Atom = Atom(0x018109); // inputmode
pub const INS: Atom = Atom(0x051503); // ins
pub const INTEGRITY: Atom = Atom(0x018A09); // integrity
pub const IS: Atom = Atom(0x01E502); // is
pub const ISINDEX: Atom = Atom(0x030607); // isindex
pub const ISMAP: Atom = Atom(0x044505); // ismap
pub const ITEMID: Atom = Atom(0x03B706); // itemid
pub const ITEMPROP: Atom = Atom(0x022808); // itemprop
pub const ITEMREF: Atom = Atom(0x030D07); // itemref
pub const ITEMSCOPE: Atom = Atom(0x019309); // itemscope
pub const ITEMTYPE: Atom = Atom(0x023008); // itemtype
pub const KBD: Atom = Atom(0x051803); // kbd
pub const KEYGEN: Atom = Atom(0x03BD06); // keygen
pub const KEYTYPE: Atom = Atom(0x031407); // keytype
pub const KIND: Atom = Atom(0x04C904); // kind
pub const LABEL: Atom = Atom(0x044A05); // label
pub const LANG: Atom = Atom(0x022404); // lang
pub const LEGEND: Atom = Atom(0x03C306); // legend
pub const LI: Atom = Atom(0x006302); // li
pub const LINK: Atom = Atom(0x042D04); // link
pub const LIST: Atom = Atom(0x01E404); // list
pub const LISTING: Atom = Atom(0x031B07); // listing
pub const LOOP: Atom = Atom(0x04CD04); // loop
pub const LOW: Atom = Atom(0x000203); // low
pub const MAIN: Atom = Atom(0x04D104); // main
pub const MALIGNMARK: Atom = Atom(0x012B0A); // malignmark
pub const MANIFEST: Atom = Atom(0x023808); // manifest
pub const MAP: Atom = Atom(0x041A03); // map
pub const MARK: Atom = Atom(0x013104); // mark
pub const MARQUEE: Atom = Atom(0x032207); // marquee
pub const MATH: Atom = Atom(0x04D504); // math
pub const MAX: Atom = Atom(0x019C03); // max
pub const MAXLENGTH: Atom = Atom(0x019C09); // maxlength
pub const MEDIA: Atom = Atom(0x004805); // media
pub const MEDIAGROUP: Atom = Atom(0x01350A); // mediagroup
pub const MENU: Atom = Atom(0x00BF04); // menu
pub const MENUITEM: Atom = Atom(0x024008); // menuitem
pub const META: Atom = Atom(0x04D904); // meta
pub const METER: Atom = Atom(0x044F05); // meter
pub const METHOD: Atom = Atom(0x011106); // method
pub const MGLYPH: Atom = Atom(0x03C906); // mglyph
pub const MI: Atom = Atom(0x01A502); // mi
pub const MIN: Atom = Atom(0x01A503); // min
pub const MINLENGTH: Atom = Atom(0x01A509); // minlength
pub const MN: Atom = Atom(0x005E02); // mn
pub const MO: Atom = Atom(0x018602); // mo
pub const MS: Atom = Atom(0x019602); // ms
pub const MTEXT: Atom = Atom(0x045405); // mtext
pub const MULTIPLE: Atom = Atom(0x024808); // multiple
pub const MUTED: Atom = Atom(0x045905); // muted
pub const NAME: Atom = Atom(0x02FB04); // name
pub const NAV: Atom = Atom(0x051B03); // nav
pub const NOBR: Atom = Atom(0x04DD04); // nobr
pub const NOEMBED: Atom = Atom(0x032907); // noembed
pub const NOFRAMES: Atom = Atom(0x025008); // noframes
pub const NOMODULE: Atom = Atom(0x025808); // nomodule
pub const NONCE: Atom = Atom(0x045E05); // nonce
pub const NOSCRIPT: Atom = Atom(0x026008); // noscript
pub const NOVALIDATE: Atom = Atom(0x005F0A); // novalidate
pub const OBJECT: Atom = Atom(0x009906); // object
pub const OL: Atom = Atom(0x007202); // ol
pub const OPEN: Atom = Atom(0x04E104); // open
pub const OPTGROUP: Atom = Atom(0x026808); // optgroup
pub const OPTIMUM: Atom = Atom(0x033007); // optimum
pub const OPTION: Atom = Atom(0x03CF06); // option
pub const OUTPUT: Atom = Atom(0x03D506); // output
pub const P: Atom = Atom(0x000501); // p
pub const PARAM: Atom = Atom(0x046305); // param
pub const PATTERN: Atom = Atom(0x033707); // pattern
pub const PICTURE: Atom = Atom(0x033E07); // picture
pub const PING: Atom = Atom(0x04E504); // ping
pub const PLACEHOLDER: Atom = Atom(0x00D90B); // placeholder
pub const PLAINTEXT: Atom = Atom(0x01AE09); // plaintext
pub const PLAYSINLINE: Atom = Atom(0x00E40B); // playsinline
pub const POSTER: Atom = Atom(0x03DB06); // poster
pub const PRE: Atom = Atom(0x034503); // pre
pub const PRELOAD: Atom = Atom(0x034507); // preload
pub const PROGRESS: Atom = Atom(0x027008); // progress
pub const PROMPT: Atom = Atom(0x03E106); // prompt
pub const Q: Atom = Atom(0x000E01); // q
pub const RADIOGROUP: Atom = Atom(0x013F0A); // radiogroup
pub const RB: Atom = Atom(0x053F02); // rb
pub const READONLY: Atom = Atom(0x027808); // readonly
pub const REFERRERPOLICY: Atom = Atom(0x00690E); // referrerpolicy
pub const REL: Atom = Atom(0x034603); // rel
pub const REQUIRED: Atom = Atom(0x028008); // required
pub const REVERSED: Atom = Atom(0x028808); // reversed
pub const ROWS: Atom = Atom(0x034C04); // rows
pub const ROWSPAN: Atom = Atom(0x034C07); // rowspan
pub const RP: Atom = Atom(0x007002); // rp
pub const RT: Atom = Atom(0x015802); // rt
pub const RTC: Atom = Atom(0x051E03); // rtc
pub const RUBY: Atom = Atom(0x04E904); // ruby
pub const S: Atom = Atom(0x001101); // s
pub const SAMP: Atom = Atom(0x04ED04); // samp
pub const SANDBOX: Atom = Atom(0x035307); // sandbox
pub const SCOPE: Atom = Atom(0x019705); // scope
pub const SCOPED: Atom = Atom(0x03E706); // scoped
pub const SCRIPT: Atom = Atom(0x026206); // script
pub const SEAMLESS: Atom = Atom(0x029008); // seamless
pub const SECTION: Atom = Atom(0x035A07); // section
pub const SELECT: Atom = Atom(0x029806); // select
pub const SELECTED: Atom = Atom(0x029808); // selected
pub const SHAPE: Atom = Atom(0x046805); // shape
pub const SIZE: Atom = Atom(0x046D04); // size
pub const SIZES: Atom = Atom(0x046D05); // sizes
pub const SLOT: Atom = Atom(0x04F104); // slot
pub const SMALL: Atom = Atom(0x047205); // small
pub const SORTABLE: Atom = Atom(0x02A008); // sortable
pub const SORTED: Atom = Atom(0x03ED06); // sorted
pub const SOURCE: Atom = Atom(0x03F306); // source
pub const SPACER: Atom = Atom(0x03F906); // spacer
pub const SPAN: Atom = Atom(0x02DF04); // span
pub const SPELLCHECK: Atom = Atom(0x01490A); // spellcheck
pub const SRC: Atom = Atom(0x036103); // src
pub const SRCDOC: Atom = Atom(0x03FF06); // srcdoc
pub const SRCLANG: Atom = Atom(0x036107); // srclang
pub const SRCSET: Atom = Atom(0x040506); // srcset
pub const START: Atom = Atom(0x047705); // start
pub const STEP: Atom = Atom(0x04F504); // step
pub const STRIKE: Atom = Atom(0x040B06); // strike
pub const STRONG: Atom = Atom(0x041106); // strong
pub const STYLE: Atom = Atom(0x047C05); // style
pub const SUB: Atom = Atom(0x052103); // sub
pub const SUMMARY: Atom = Atom(0x036807); // summary
pub const SUP: Atom = Atom(0x052403); // sup
pub const SVG: Atom = Atom(0x052703); // svg
pub const TABINDEX: Atom = Atom(0x02A808); // tabindex
pub const TABLE: Atom = Atom(0x002C05); // table
pub const TARGET: Atom = Atom(0x011B06); // target
pub const TBODY: Atom = Atom(0x048105); // tbody
pub const TD: Atom = Atom(0x01E702); // td
pub const TEMPLATE: Atom = Atom(0x02B008); // template
pub const TEXTAREA: Atom = Atom(0x02B808); // textarea
pub const TFOOT: Atom = Atom(0x048605); // tfoot
pub const TH: Atom = Atom(0x011302); // th
pub const THEAD: Atom = Atom(0x048B05); // thead
pub const TIME: Atom = Atom(0x01EC04); // time
pub const TITLE: Atom = Atom(0x049005); // title
pub const TR: Atom = Atom(0x000B02); // tr
pub const TRACK: Atom = Atom(0x049505); // track
pub const TRANSLATE: Atom = Atom(0x01B709); // translate
pub const TT: Atom = Atom(0x009E02); // tt
pub const TYPE: Atom = Atom(0x009F04); // type
pub const TYPEMUSTMATCH: Atom = Atom(0x009F0D); // typemustmatch
pub const U: Atom = Atom(0x000F01); // u
pub const UL: Atom = Atom(0x001902); // ul
pub const UPDATEVIACACHE: Atom = Atom(0x00770E); // updateviacache
pub const USEMAP: Atom = Atom(0x041706); // usemap
pub const VALUE: Atom = Atom(0x049A05); // value
pub const VAR: Atom = Atom(0x052A03); // var
pub const VIDEO: Atom = Atom(0x049F05); // video
pub const WBR: Atom = Atom(0x052D03); // wbr
pub const WIDTH: Atom = Atom(0x04A405); // width
pub const WORKERTYPE: Atom = Atom(0x01530A); // workertype
pub const WRAP: Atom = Atom(0x04F904); // wrap
pub const XMP: Atom = Atom(0x053003); // xmp

pub(crate) const MAX_ATOM_LEN: usize = 19;
pub(crate) const HASH0: u32 = 0x7C65C1E6;

pub(crate) static ATOM_TEXT: &str = "allowpaymentrequestallowfullscreencontenteditableaccept-charsetallowusermediaannotation-xmlformnovalidatereferrerpolicyupdateviacacheforeignObjectforeignobjecttypemustmatchautocompletecontextmenucrossoriginformenctypeplaceholderplaysinlineblockquotefigcaptionformactionformmethodformtargethttp-equivmalignmarkmediagroupradiogroupspellcheckworkertypeaccesskeyautofocuschallengedraggableinputmodeintegrityitemscopemaxlengthminlengthplaintexttranslateautoplaybasefontcolgroupcontrolsdatalistdatetimedisableddownloaddropzoneencodingfieldsetframesethreflangitempropitemtypemanifestmenuitemmultiplenoframesnomodulenoscriptoptgroupprogressreadonlyrequiredreversedseamlessselectedsortabletabindextemplatetextareaaddressarticlebgsoundcheckedcolspancommanddefaultdetailsdirnameheadersisindexitemrefkeytypelistingmarqueenoembedoptimumpatternpicturepreloadrowspansandboxsectionsrclangsummaryappletbuttoncanvascentercoordsdialogfigurefooterheighthgrouphiddeniframeitemidkeygenlegendmglyphoptionoutputposterpromptscopedsortedsourcespacersrcdocsrcsetstrikestrongusemapasideasyncaudioblinkclasscolordeferimageismaplabelmetermtextmutednonceparamshapesizessmallstartstyletbodytfoottheadtitletrackvaluevideowidthabbrcitecodedescfacehighhtmliconkindloopmainmathmetanobropenpingrubysampslotstepwrapaltbdibdobigdeldfndivimginskbdnavrtcsubsupsvgvarwbrxmph1h2h3h4h5h6rb";

pub(crate) static ATOM_TABLE: [Atom; 512] = [
    Atom(0x048B05), // thead
    Atom(0),
    Atom(0x00920D), // foreignobject
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x00B80B), // contextmenu
    Atom(0),
    Atom(0x01AE09), // plaintext
    Atom(0x03C906), // mglyph
    Atom(0x00CE0B), // formenctype
    Atom(0),
    Atom(0x02C007), // address
    Atom(0x021808), // frameset
    Atom(0x019602), // ms
    Atom(0),
    Atom(0x049005), // title
    Atom(0x04B904), // face
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x053302), // h1
    Atom(0),
    Atom(0),
    Atom(0x018A09), // integrity
    Atom(0x018602), // mo
    Atom(0),
    Atom(0x04CD04), // loop
    Atom(0x00F90A), // figcaption
    Atom(0x041D05), // aside
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x040506), // srcset
    Atom(0),
    Atom(0x038D06), // dialog
    Atom(0x020808), // encoding
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x000B02), // tr
    Atom(0),
    Atom(0),
    Atom(0x000501), // p
    Atom(0),
    Atom(0),
    Atom(0x02FB04), // name
    Atom(0),
    Atom(0x04F504), // step
    Atom(0x050303), // bdo
    Atom(0x024808), // multiple
    Atom(0x016609), // autofocus
    Atom(0),
    Atom(0x01210A), // http-equiv
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x043B05), // defer
    Atom(0x01EC04), // time
    Atom(0x00C30B), // crossorigin
    Atom(0),
    Atom(0x01C902), // as
    Atom(0x012B0A), // malignmark
    Atom(0x01E004), // data
    Atom(0x038106), // center
    Atom(0),
    Atom(0x03ED06), // sorted
    Atom(0),
    Atom(0x027008), // progress
    Atom(0x03E106), // prompt
    Atom(0x022008), // hreflang
    Atom(0),
    Atom(0),
    Atom(0x01F808), // download
    Atom(0x046305), // param
    Atom(0),
    Atom(0),
    Atom(0x03E706), // scoped
    Atom(0),
    Atom(0x02B808), // textarea
    Atom(0x00770E), // updateviacache
    Atom(0x04E904), // ruby
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x049F05), // video
    Atom(0),
    Atom(0x005B03), // for
    Atom(0x04F104), // slot
    Atom(0),
    Atom(0),
    Atom(0x034503), // pre
    Atom(0x04FD03), // alt
    Atom(0),
    Atom(0x04F904), // wrap
    Atom(0),
    Atom(0x025808), // nomodule
    Atom(0x02E307), // command
    Atom(0x022002), // hr
    Atom(0x000F01), // u
    Atom(0),
    Atom(0x01C804), // base
    Atom(0x02DC07), // colspan
    Atom(0x039F06), // height
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x039906), // footer
    Atom(0x00D207), // enctype
    Atom(0),
    Atom(0),
    Atom(0x017809), // draggable
    Atom(0),
    Atom(0x03C306), // legend
    Atom(0x02B008), // template
    Atom(0x019309), // itemscope
    Atom(0x037B06), // canvas
    Atom(0x034C04), // rows
    Atom(0x02FF07), // headers
    Atom(0),
    Atom(0x02F807), // dirname
    Atom(0x015D09), // accesskey
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x047C05), // style
    Atom(0),
    Atom(0),
    Atom(0x034507), // preload
    Atom(0),
    Atom(0),
    Atom(0x043105), // class
    Atom(0x032B05), // embed
    Atom(0),
    Atom(0x037506), // button
    Atom(0),
    Atom(0x023808), // manifest
    Atom(0),
    Atom(0),
    Atom(0x021008), // fieldset
    Atom(0x04C504), // icon
    Atom(0),
    Atom(0x051203), // img
    Atom(0x048605), // tfoot
    Atom(0x021805), // frame
    Atom(0),
    Atom(0x030607), // isindex
    Atom(0x003807), // charset
    Atom(0),
    Atom(0x042C05), // blink
    Atom(0),
    Atom(0),
    Atom(0x033007), // optimum
    Atom(0),
    Atom(0x01F008), // disabled
    Atom(0x045405), // mtext
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x01A509), // minlength
    Atom(0),
    Atom(0x01A502), // mi
    Atom(0x011106), // method
    Atom(0),
    Atom(0),
    Atom(0x022404), // lang
    Atom(0x053B02), // h5
    Atom(0x042205), // async
    Atom(0x016F09), // challenge
    Atom(0),
    Atom(0x020008), // dropzone
    Atom(0),
    Atom(0),
    Atom(0x028808), // reversed
    Atom(0x000E01), // q
    Atom(0x004805), // media
    Atom(0x03F906), // spacer
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x02A808), // tabindex
    Atom(0x040B06), // strike
    Atom(0),
    Atom(0x029806), // select
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x02C707), // article
    Atom(0x022004), // href
    Atom(0x01530A), // workertype
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x02CE07), // bgsound
    Atom(0x043605), // color
    Atom(0x034C07), // rowspan
    Atom(0),
    Atom(0x002E01), // b
    Atom(0),
    Atom(0),
    Atom(0x044F05), // meter
    Atom(0x03AB06), // hidden
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x044505), // ismap
    Atom(0x00850D), // foreignObject
    Atom(0),
    Atom(0x013104), // mark
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x04D904), // meta
    Atom(0x003F0E), // allowusermedia
    Atom(0x047705), // start
    Atom(0x042D04), // link
    Atom(0x053003), // xmp
    Atom(0),
    Atom(0x018109), // inputmode
    Atom(0x036807), // summary
    Atom(0),
    Atom(0),
    Atom(0x04AD04), // cite
    Atom(0x00AC0C), // autocomplete
    Atom(0),
    Atom(0x038706), // coords
    Atom(0),
    Atom(0x048105), // tbody
    Atom(0x025008), // noframes
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x00310E), // accept-charset
    Atom(0),
    Atom(0),
    Atom(0x01E404), // list
    Atom(0x01E808), // datetime
    Atom(0x033707), // pattern
    Atom(0x006302), // li
    Atom(0x04BD04), // high
    Atom(0x03FF06), // srcdoc
    Atom(0x01F702), // dd
    Atom(0x045E05), // nonce
    Atom(0),
    Atom(0x00220F), // contenteditable
    Atom(0),
    Atom(0x04AB02), // br
    Atom(0x04CC02), // dl
    Atom(0x02DF04), // span
    Atom(0),
    Atom(0x010D0A), // formmethod
    Atom(0),
    Atom(0x051E03), // rtc
    Atom(0),
    Atom(0),
    Atom(0x009E02), // tt
    Atom(0),
    Atom(0x050603), // big
    Atom(0x045905), // muted
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x051503), // ins
    Atom(0x04D104), // main
    Atom(0x02FF04), // head
    Atom(0),
    Atom(0),
    Atom(0x052D03), // wbr
    Atom(0),
    Atom(0x034603), // rel
    Atom(0x053902), // h4
    Atom(0),
    Atom(0x015802), // rt
    Atom(0x006402), // id
    Atom(0x011302), // th
    Atom(0),
    Atom(0x000203), // low
    Atom(0),
    Atom(0),
    Atom(0x01E702), // td
    Atom(0x041A03), // map
    Atom(0x042705), // audio
    Atom(0x036F06), // applet
    Atom(0),
    Atom(0x053F02), // rb
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x01490A), // spellcheck
    Atom(0x01D003), // col
    Atom(0x01E502), // is
    Atom(0x03F306), // source
    Atom(0x033E07), // picture
    Atom(0),
    Atom(0x031B07), // listing
    Atom(0x002B01), // i
    Atom(0x050903), // del
    Atom(0x050F03), // div
    Atom(0),
    Atom(0x004D0E), // annotation-xml
    Atom(0),
    Atom(0x019705), // scope
    Atom(0),
    Atom(0),
    Atom(0x022808), // itemprop
    Atom(0),
    Atom(0),
    Atom(0x053702), // h3
    Atom(0x00A202), // em
    Atom(0x046D04), // size
    Atom(0x04E504), // ping
    Atom(0),
    Atom(0),
    Atom(0x01030A), // formaction
    Atom(0x030D07), // itemref
    Atom(0),
    Atom(0x049A05), // value
    Atom(0x007202), // ol
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x035A07), // section
    Atom(0),
    Atom(0x044005), // image
    Atom(0x04D504), // math
    Atom(0),
    Atom(0x011B06), // target
    Atom(0x03D506), // output
    Atom(0),
    Atom(0),
    Atom(0x024008), // menuitem
    Atom(0),
    Atom(0x032207), // marquee
    Atom(0),
    Atom(0x009F04), // type
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x018105), // input
    Atom(0),
    Atom(0x02F107), // details
    Atom(0x050003), // bdi
    Atom(0x009906), // object
    Atom(0x03DB06), // poster
    Atom(0x00FC07), // caption
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x007002), // rp
    Atom(0x00EF0A), // blockquote
    Atom(0),
    Atom(0x02FF06), // header
    Atom(0x027808), // readonly
    Atom(0),
    Atom(0x050C03), // dfn
    Atom(0x04A405), // width
    Atom(0x035307), // sandbox
    Atom(0),
    Atom(0x003106), // accept
    Atom(0x04ED04), // samp
    Atom(0x00130F), // allowfullscreen
    Atom(0),
    Atom(0),
    Atom(0x00D90B), // placeholder
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x051B03), // nav
    Atom(0),
    Atom(0x01170A), // formtarget
    Atom(0x002C05), // table
    Atom(0x010706), // action
    Atom(0),
    Atom(0x02F803), // dir
    Atom(0),
    Atom(0),
    Atom(0x00E40B), // playsinline
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x052103), // sub
    Atom(0x000001), // a
    Atom(0),
    Atom(0x02D507), // checked
    Atom(0x01D808), // controls
    Atom(0),
    Atom(0x028008), // required
    Atom(0x02EA07), // default
    Atom(0),
    Atom(0x023008), // itemtype
    Atom(0),
    Atom(0x001101), // s
    Atom(0x005B04), // form
    Atom(0x036107), // srclang
    Atom(0x039306), // figure
    Atom(0),
    Atom(0x052703), // svg
    Atom(0x04A904), // abbr
    Atom(0x048F02), // dt
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x048204), // body
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x03BD06), // keygen
    Atom(0x046805), // shape
    Atom(0),
    Atom(0),
    Atom(0x03B706), // itemid
    Atom(0x019C09), // maxlength
    Atom(0x04DD04), // nobr
    Atom(0x029008), // seamless
    Atom(0),
    Atom(0x053502), // h2
    Atom(0x032907), // noembed
    Atom(0),
    Atom(0x04C904), // kind
    Atom(0x036103), // src
    Atom(0x005E02), // mn
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x01A503), // min
    Atom(0),
    Atom(0x013F0A), // radiogroup
    Atom(0),
    Atom(0),
    Atom(0),
    Atom(0x019C03), // max
    Atom(0),
    Atom(0x026008), // noscript
    Atom(0),
    Atom(0x00BF04), // menu
    Atom(0x03A506), // hgroup
    Atom(0),
    Atom(0x029808), // selected
    Atom(0x000013), // allowpaymentrequest
    Atom(0),
    Atom(0x00690E), // referrerpolicy
    Atom(0),
    Atom(0x005F0A), // novalidate
    Atom(0x02A008), // sortable
    Atom(0),
    Atom(0x002207), // content
    Atom(0x04B504), // desc
    Atom(0x01350A), // mediagroup
    Atom(0),
    Atom(0),
    Atom(0x009F0D), // typemustmatch
    Atom(0),
    Atom(0),
    Atom(0x01C008), // autoplay
    Atom(0),
    Atom(0),
    Atom(0x01C808), // basefont
    Atom(0),
    Atom(0),
    Atom(0x031407), // keytype
    Atom(0x026808), // optgroup
    Atom(0),
    Atom(0),
    Atom(0x052A03), // var
    Atom(0x052403), // sup
    Atom(0x04B104), // code
    Atom(0),
    Atom(0),
    Atom(0x03B106), // iframe
    Atom(0x001902), // ul
    Atom(0x051803), // kbd
    Atom(0),
    Atom(0),
    Atom(0x02BC04), // area
    Atom(0x01B709), // translate
    Atom(0x026206), // script
    Atom(0x04E104), // open
    Atom(0x01CC04), // font
    Atom(0),
    Atom(0),
    Atom(0x047205), // small
    Atom(0x03CF06), // option
    Atom(0x044A05), // label
    Atom(0),
    Atom(0x02DC04), // cols
    Atom(0),
    Atom(0),
    Atom(0x005B0E), // formnovalidate
    Atom(0x01E008), // datalist
    Atom(0),
    Atom(0x053D02), // h6
    Atom(0x049505), // track
    Atom(0),
    Atom(0),
    Atom(0x01D008), // colgroup
    Atom(0x041106), // strong
    Atom(0x041706), // usemap
    Atom(0),
    Atom(0x046D05), // sizes
    Atom(0),
    Atom(0x04C104), // html
    Atom(0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_roundtrip() {
        // Every interned name must survive lookup -> as_str unchanged.
        for a in ATOM_TABLE.iter().filter(|a| !a.is_unknown()) {
            let name = a.as_str();
            assert_eq!(Atom::lookup(name.as_bytes()), *a, "{name}");
            assert_eq!(Atom::lookup(name.as_bytes()).as_str(), name);
        }
    }

    #[test]
    fn lookup_misses() {
        assert_eq!(Atom::lookup(b""), Atom(0));
        assert_eq!(Atom::lookup(b"zzzznotatag"), Atom(0));
        // Lookup is case-sensitive; the table stores lower-cased tag names.
        assert_eq!(Atom::lookup(b"DIV"), Atom(0));
        // One byte longer than the longest interned name.
        assert_eq!(Atom::lookup(b"allowpaymentrequests"), Atom(0));
    }

    #[test]
    fn lookup_collision_adversaries() {
        // Names that share a candidate slot with a real atom but differ in
        // content must still miss.
        for a in ATOM_TABLE.iter().filter(|a| !a.is_unknown()) {
            let mut name = a.as_str().as_bytes().to_vec();
            let last = name.len() - 1;
            name[last] ^= 0x20; // flip case of the final byte
            let found = Atom::lookup(&name);
            if found != Atom(0) {
                // Flipping case may land on another real atom (e.g. the
                // SVG camelCase names); that atom must then match exactly.
                assert_eq!(found.as_str().as_bytes(), &name[..]);
            }
        }
    }

    #[test]
    fn known_tags() {
        assert_eq!(Atom::lookup(b"div"), DIV);
        assert_eq!(Atom::lookup(b"annotation-xml"), ANNOTATION_XML);
        assert_eq!(Atom::lookup(b"foreignObject"), FOREIGN_OBJECT);
        assert_eq!(Atom::lookup(b"foreignobject"), FOREIGNOBJECT);
        assert_eq!(DIV.as_str(), "div");
        assert_eq!(TEMPLATE.as_str(), "template");
    }
}
