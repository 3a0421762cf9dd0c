//! Font catalog and font resolution.
//!
//! A [`FontResolver`] turns a [`FontRequest`] (family, bold, italic, size)
//! into a renderable [`ResolvedFont`]. Resolution walks a fixed fallback
//! chain and never fails:
//!
//! 1. styled file name guess (`arialbd.ttf`)
//! 2. hyphenated file name guess (`Arial-Bold.ttf`)
//! 3. family name lookup in the catalog (style flags ignored)
//! 4. wide-coverage fallback fonts
//! 5. the built-in bitmap font
//!
//! Font files come from an injected [`FontCatalog`], so tests and embedders
//! control exactly which fonts exist.

use super::bitmap_font::BitmapFont;
use super::WatermarkError;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Ordered wide-coverage fonts tried when the requested family is missing
/// or cannot render the text.
pub const DEFAULT_FALLBACK_FONTS: &[&str] = &[
    "msyh.ttc",
    "simhei.ttf",
    "simsun.ttc",
    "arialuni.ttf",
    "NotoSansCJK-Regular.ttc",
    "DejaVuSans.ttf",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Well-known families whose file names do not follow from the family name.
const FAMILY_ALIASES: &[(&str, &[&str])] = &[
    ("microsoftyahei", &["msyh.ttc", "msyh.ttf"]),
    ("simhei", &["simhei.ttf"]),
    ("simsun", &["simsun.ttc"]),
    ("kaiti", &["simkai.ttf"]),
    ("arial", &["arial.ttf"]),
    ("timesnewroman", &["times.ttf"]),
    ("couriernew", &["cour.ttf"]),
    ("verdana", &["verdana.ttf"]),
    ("georgia", &["georgia.ttf"]),
];

/// Logical font request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRequest {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    /// Size in points; one point renders as one pixel.
    pub size_pt: u32,
}

impl FontRequest {
    pub fn new(family: impl Into<String>, bold: bool, italic: bool, size_pt: u32) -> Self {
        Self {
            family: family.into(),
            bold,
            italic,
            size_pt: size_pt.max(1),
        }
    }

    /// Step 1 guess, e.g. `arialbd.ttf`.
    pub fn styled_file_name(&self) -> String {
        let suffix = match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "bd",
            (false, true) => "i",
            (true, true) => "bi",
        };
        format!(
            "{}{}.ttf",
            self.family.to_lowercase().replace(' ', ""),
            suffix
        )
    }

    /// Step 2 guess, e.g. `Arial-BoldItalic.ttf`.
    pub fn hyphenated_file_name(&self) -> String {
        let style = match (self.bold, self.italic) {
            (false, false) => "Regular",
            (true, false) => "Bold",
            (false, true) => "Italic",
            (true, true) => "BoldItalic",
        };
        format!("{}-{}.ttf", self.family.replace(' ', ""), style)
    }

    fn size_px(&self) -> f32 {
        self.size_pt.max(1) as f32
    }
}

impl fmt::Display for FontRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.bold {
            write!(f, " Bold")?;
        }
        if self.italic {
            write!(f, " Italic")?;
        }
        write!(f, " {}pt", self.size_pt)
    }
}

/// Queryable source of font files.
pub trait FontCatalog: Send + Sync {
    /// Raw bytes of the font file with this exact name (case-insensitive).
    fn load_file(&self, file_name: &str) -> Option<Vec<u8>>;

    /// Raw bytes of a font for this family name.
    fn load_family(&self, family: &str) -> Option<Vec<u8>>;

    /// Family names available for selection.
    fn families(&self) -> Vec<String>;
}

/// Catalog without any fonts. Every request ends at the bitmap font.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl FontCatalog for EmptyCatalog {
    fn load_file(&self, _file_name: &str) -> Option<Vec<u8>> {
        None
    }

    fn load_family(&self, _family: &str) -> Option<Vec<u8>> {
        None
    }

    fn families(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory catalog keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFontCatalog {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, file_name: &str, data: Vec<u8>) -> Self {
        self.insert(file_name, data);
        self
    }

    pub fn insert(&mut self, file_name: &str, data: Vec<u8>) {
        self.files.insert(file_name.to_lowercase(), data);
    }
}

impl FontCatalog for MemoryFontCatalog {
    fn load_file(&self, file_name: &str) -> Option<Vec<u8>> {
        self.files.get(&file_name.to_lowercase()).cloned()
    }

    fn load_family(&self, family: &str) -> Option<Vec<u8>> {
        let name = match_family(family, self.files.keys().map(String::as_str))?;
        self.files.get(&name).cloned()
    }

    fn families(&self) -> Vec<String> {
        family_names(self.files.keys().map(String::as_str))
    }
}

/// Catalog backed by font files found under a set of directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFontCatalog {
    /// Lower-cased file name to path. The first directory wins on duplicates.
    files: BTreeMap<String, PathBuf>,
}

impl DirectoryFontCatalog {
    /// Index font files under `directories`, recursively.
    pub fn scan(directories: &[PathBuf]) -> Self {
        let mut files = BTreeMap::new();

        for dir in directories {
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "Font directory not found, skipping");
                continue;
            }

            for entry in WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if !is_font_file(entry.path()) {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_lowercase();
                files
                    .entry(name)
                    .or_insert_with(|| entry.path().to_path_buf());
            }
        }

        tracing::debug!(
            directories = directories.len(),
            fonts = files.len(),
            "Indexed font files"
        );

        Self { files }
    }

    /// Index the platform's usual font directories.
    pub fn system() -> Self {
        Self::scan(&default_font_directories())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.files.get(key)?;
        match std::fs::read(path) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Failed to read font file");
                None
            }
        }
    }
}

impl FontCatalog for DirectoryFontCatalog {
    fn load_file(&self, file_name: &str) -> Option<Vec<u8>> {
        self.read(&file_name.to_lowercase())
    }

    fn load_family(&self, family: &str) -> Option<Vec<u8>> {
        let name = match_family(family, self.files.keys().map(String::as_str))?;
        self.read(&name)
    }

    fn families(&self) -> Vec<String> {
        family_names(self.files.keys().map(String::as_str))
    }
}

/// Font directories searched by [`DirectoryFontCatalog::system`].
pub fn default_font_directories() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if cfg!(target_os = "windows") {
        let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
        dirs.push(PathBuf::from(windir).join("Fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lower-case alphanumerics only: "Microsoft YaHei" -> "microsoftyahei".
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// Pick the file (from lower-cased `file_names`) that best matches a family.
fn match_family<'a>(family: &str, file_names: impl Iterator<Item = &'a str>) -> Option<String> {
    let wanted = normalize_name(family);
    if wanted.is_empty() {
        return None;
    }

    let names: Vec<&str> = file_names.collect();

    if let Some((_, aliases)) = FAMILY_ALIASES.iter().find(|(alias, _)| *alias == wanted) {
        for alias in aliases.iter() {
            if let Some(name) = names.iter().find(|n| **n == alias.to_lowercase()) {
                return Some(name.to_string());
            }
        }
    }

    let regular = format!("{}regular", wanted);
    names
        .iter()
        .find(|n| normalize_name(file_stem(n)) == wanted)
        .or_else(|| {
            names
                .iter()
                .find(|n| normalize_name(file_stem(n)) == regular)
        })
        .map(|n| n.to_string())
}

fn family_names<'a>(file_names: impl Iterator<Item = &'a str>) -> Vec<String> {
    file_names
        .map(|n| file_stem(n).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Which step of the fallback chain produced a font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    StyledFile,
    HyphenatedFile,
    SystemFamily,
    Fallback(String),
    BuiltinBitmap,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StyledFile => write!(f, "styled file"),
            Self::HyphenatedFile => write!(f, "hyphenated file"),
            Self::SystemFamily => write!(f, "system family"),
            Self::Fallback(name) => write!(f, "fallback font {}", name),
            Self::BuiltinBitmap => write!(f, "built-in bitmap font"),
        }
    }
}

/// Glyph source behind a resolved font.
#[derive(Clone)]
pub enum FontFace {
    Outline(FontArc),
    Bitmap(BitmapFont),
}

/// A renderable font at a fixed pixel size.
#[derive(Clone)]
pub struct ResolvedFont {
    face: FontFace,
    size_px: f32,
    source: FontSource,
}

impl fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let face = match self.face {
            FontFace::Outline(_) => "outline",
            FontFace::Bitmap(_) => "bitmap",
        };
        f.debug_struct("ResolvedFont")
            .field("face", &face)
            .field("size_px", &self.size_px)
            .field("source", &self.source)
            .finish()
    }
}

impl ResolvedFont {
    fn outline(font: FontArc, size_px: f32, source: FontSource) -> Self {
        Self {
            face: FontFace::Outline(font),
            size_px,
            source,
        }
    }

    /// The built-in bitmap font.
    pub fn builtin() -> Self {
        let font = BitmapFont;
        Self {
            size_px: font.line_height() as f32,
            face: FontFace::Bitmap(font),
            source: FontSource::BuiltinBitmap,
        }
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn scale(&self) -> PxScale {
        PxScale::from(self.size_px)
    }

    /// Baseline distance from the top of the line, in pixels.
    pub fn ascent(&self) -> f32 {
        match &self.face {
            FontFace::Outline(font) => font.as_scaled(self.scale()).ascent(),
            FontFace::Bitmap(font) => font.ascent(),
        }
    }

    /// Extent below the baseline, in pixels (zero or negative).
    pub fn descent(&self) -> f32 {
        match &self.face {
            FontFace::Outline(font) => font.as_scaled(self.scale()).descent(),
            FontFace::Bitmap(font) => font.descent(),
        }
    }

    /// Whether a fallback replaced the requested font.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.source,
            FontSource::Fallback(_) | FontSource::BuiltinBitmap
        )
    }

    /// Whether every visible character of `text` has a glyph.
    pub fn covers(&self, text: &str) -> bool {
        let mut visible = text.chars().filter(|c| !c.is_whitespace());
        match &self.face {
            FontFace::Outline(font) => visible.all(|c| font.glyph_id(c).0 != 0),
            FontFace::Bitmap(font) => visible.all(|c| font.has_glyph(c)),
        }
    }

    /// The degraded condition to report for `request`, if any.
    pub fn degradation(&self, request: &FontRequest) -> Option<WatermarkError> {
        self.is_degraded()
            .then(|| WatermarkError::FontResolutionDegraded {
                requested: request.to_string(),
                resolved: self.source.to_string(),
            })
    }
}

#[derive(Default)]
struct FontCache {
    requests: HashMap<FontRequest, ResolvedFont>,
    /// Parsed fallback fonts by file name; `None` when missing or invalid.
    fallbacks: HashMap<String, Option<FontArc>>,
}

/// Resolves font requests against a catalog, memoizing the results.
pub struct FontResolver {
    catalog: Arc<dyn FontCatalog>,
    fallback_fonts: Vec<String>,
    cache: Mutex<FontCache>,
}

impl fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontResolver")
            .field("fallback_fonts", &self.fallback_fonts)
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl FontResolver {
    pub fn new(catalog: Arc<dyn FontCatalog>) -> Self {
        Self {
            catalog,
            fallback_fonts: DEFAULT_FALLBACK_FONTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache: Mutex::new(FontCache::default()),
        }
    }

    /// Resolver that only ever produces the bitmap font.
    pub fn builtin() -> Self {
        Self::new(Arc::new(EmptyCatalog))
    }

    /// Replace the ordered list of wide-coverage fallback fonts.
    pub fn with_fallback_fonts(mut self, fonts: Vec<String>) -> Self {
        self.fallback_fonts = fonts;
        self
    }

    pub fn catalog(&self) -> &dyn FontCatalog {
        self.catalog.as_ref()
    }

    /// Resolve a request. Never fails; degraded results are logged once per
    /// distinct request.
    pub fn resolve(&self, request: &FontRequest) -> ResolvedFont {
        let key = FontRequest {
            size_pt: request.size_pt.max(1),
            ..request.clone()
        };

        if let Some(font) = self.cache.lock().requests.get(&key) {
            return font.clone();
        }

        let font = self.resolve_uncached(&key);
        if let Some(degraded) = font.degradation(&key) {
            tracing::warn!(
                family = %key.family,
                bold = key.bold,
                italic = key.italic,
                source = %font.source(),
                "{}",
                degraded
            );
        }

        self.cache.lock().requests.insert(key, font.clone());
        font
    }

    /// Resolve a request for specific text. When the resolved font lacks
    /// glyphs for the text, the first fallback font that covers it is used.
    pub fn resolve_for_text(&self, request: &FontRequest, text: &str) -> ResolvedFont {
        let primary = self.resolve(request);
        if primary.covers(text) {
            return primary;
        }
        self.fallback_for_text(primary, request, text)
    }

    /// First fallback font other than `primary` that covers `text`, or
    /// `primary` when none does.
    fn fallback_for_text(
        &self,
        primary: ResolvedFont,
        request: &FontRequest,
        text: &str,
    ) -> ResolvedFont {
        for name in &self.fallback_fonts {
            if primary.source() == &FontSource::Fallback(name.clone()) {
                continue;
            }
            let Some(font) = self.fallback_font(name) else {
                continue;
            };
            let candidate =
                ResolvedFont::outline(font, request.size_px(), FontSource::Fallback(name.clone()));
            if candidate.covers(text) {
                tracing::warn!(
                    family = %request.family,
                    bold = request.bold,
                    italic = request.italic,
                    primary = %primary.source(),
                    source = %candidate.source(),
                    "Requested font cannot render text, using fallback"
                );
                return candidate;
            }
        }

        tracing::debug!(
            family = %request.family,
            source = %primary.source(),
            "No available font covers the text"
        );
        primary
    }

    /// Drop all memoized fonts.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.requests.clear();
        cache.fallbacks.clear();
    }

    /// Number of memoized requests.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().requests.len()
    }

    fn resolve_uncached(&self, request: &FontRequest) -> ResolvedFont {
        let size_px = request.size_px();

        let guesses = [
            (request.styled_file_name(), FontSource::StyledFile),
            (request.hyphenated_file_name(), FontSource::HyphenatedFile),
        ];
        for (file_name, source) in guesses {
            if let Some(font) = self
                .catalog
                .load_file(&file_name)
                .and_then(|data| parse_font(data, &file_name))
            {
                return ResolvedFont::outline(font, size_px, source);
            }
        }

        if let Some(font) = self
            .catalog
            .load_family(&request.family)
            .and_then(|data| parse_font(data, &request.family))
        {
            if request.bold || request.italic {
                tracing::debug!(
                    family = %request.family,
                    "Style flags ignored for family lookup"
                );
            }
            return ResolvedFont::outline(font, size_px, FontSource::SystemFamily);
        }

        for name in &self.fallback_fonts {
            if let Some(font) = self.fallback_font(name) {
                return ResolvedFont::outline(font, size_px, FontSource::Fallback(name.clone()));
            }
        }

        ResolvedFont::builtin()
    }

    fn fallback_font(&self, name: &str) -> Option<FontArc> {
        if let Some(cached) = self.cache.lock().fallbacks.get(name) {
            return cached.clone();
        }

        let font = self
            .catalog
            .load_file(name)
            .and_then(|data| parse_font(data, name));
        self.cache
            .lock()
            .fallbacks
            .insert(name.to_string(), font.clone());
        font
    }
}

fn parse_font(data: Vec<u8>, name: &str) -> Option<FontArc> {
    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::debug!(font = %name, error = %e, "Font data could not be parsed");
            None
        }
    }
}
