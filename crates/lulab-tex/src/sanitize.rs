//! Text fixes applied to templates and generated bodies before `pdflatex` sees them.
//!
//! Notebook exports routinely contain Unicode that `pdflatex` cannot typeset
//! (Greek letters, sub/superscript digits, invisible joiners). These are
//! rewritten to plain LaTeX. None of the replacement strings contain a
//! character that is itself rewritten, so [`sanitize_unicode_math`] is
//! idempotent.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Greek letters to math-mode macros. Letters identical to Latin ones map to the Latin letter.
pub const GREEK: &[(char, &str)] = &[
    ('α', r"$\alpha$"),
    ('β', r"$\beta$"),
    ('γ', r"$\gamma$"),
    ('δ', r"$\delta$"),
    ('ε', r"$\epsilon$"),
    ('ζ', r"$\zeta$"),
    ('η', r"$\eta$"),
    ('θ', r"$\theta$"),
    ('ι', r"$\iota$"),
    ('κ', r"$\kappa$"),
    ('λ', r"$\lambda$"),
    ('μ', r"$\mu$"),
    ('ν', r"$\nu$"),
    ('ξ', r"$\xi$"),
    ('ο', r"$o$"),
    ('π', r"$\pi$"),
    ('ρ', r"$\rho$"),
    ('σ', r"$\sigma$"),
    ('τ', r"$\tau$"),
    ('υ', r"$\upsilon$"),
    ('φ', r"$\phi$"),
    ('χ', r"$\chi$"),
    ('ψ', r"$\psi$"),
    ('ω', r"$\omega$"),
    ('Α', r"$A$"),
    ('Β', r"$B$"),
    ('Γ', r"$\Gamma$"),
    ('Δ', r"$\Delta$"),
    ('Ε', r"$E$"),
    ('Ζ', r"$Z$"),
    ('Η', r"$H$"),
    ('Θ', r"$\Theta$"),
    ('Ι', r"$I$"),
    ('Κ', r"$K$"),
    ('Λ', r"$\Lambda$"),
    ('Μ', r"$M$"),
    ('Ν', r"$N$"),
    ('Ξ', r"$\Xi$"),
    ('Ο', r"$O$"),
    ('Π', r"$\Pi$"),
    ('Ρ', r"$P$"),
    ('Σ', r"$\Sigma$"),
    ('Τ', r"$T$"),
    ('Υ', r"$\Upsilon$"),
    ('Φ', r"$\Phi$"),
    ('Χ', r"$X$"),
    ('Ψ', r"$\Psi$"),
    ('Ω', r"$\Omega$"),
];

pub const SUBSCRIPTS: &[(char, &str)] = &[
    ('₀', "$_0$"),
    ('₁', "$_1$"),
    ('₂', "$_2$"),
    ('₃', "$_3$"),
    ('₄', "$_4$"),
    ('₅', "$_5$"),
    ('₆', "$_6$"),
    ('₇', "$_7$"),
    ('₈', "$_8$"),
    ('₉', "$_9$"),
    ('₊', "$_+$"),
    ('₋', "$_-$"),
    ('₌', "$_=$"),
    ('₍', "$_($"),
    ('₎', "$_)$"),
    ('ₐ', "$_a$"),
    ('ₑ', "$_e$"),
    ('ₕ', "$_h$"),
    ('ₖ', "$_k$"),
    ('ₗ', "$_l$"),
    ('ₘ', "$_m$"),
    ('ₙ', "$_n$"),
    ('ₒ', "$_o$"),
    ('ₚ', "$_p$"),
    ('ₛ', "$_s$"),
    ('ₜ', "$_t$"),
    ('ₓ', "$_x$"),
];

pub const SUPERSCRIPTS: &[(char, &str)] = &[
    ('⁰', "$^{0}$"),
    ('¹', "$^{1}$"),
    ('²', "$^{2}$"),
    ('³', "$^{3}$"),
    ('⁴', "$^{4}$"),
    ('⁵', "$^{5}$"),
    ('⁶', "$^{6}$"),
    ('⁷', "$^{7}$"),
    ('⁸', "$^{8}$"),
    ('⁹', "$^{9}$"),
    ('⁺', "$^{+}$"),
    ('⁻', "$^{-}$"),
    ('⁼', "$^{=}$"),
    ('⁽', "$^{(}$"),
    ('⁾', "$^{)}$"),
];

/// Symbols and invisible characters. An empty replacement removes the character.
pub const SYMBOLS: &[(char, &str)] = &[
    ('\u{1D447}', r"\ensuremath{T}"), // MATHEMATICAL ITALIC CAPITAL T
    ('≈', r"\ensuremath{\approx}"),
    ('⊙', r"\ensuremath{\odot}"),
    ('\u{2212}', "-"), // MINUS SIGN
    ('\u{2060}', ""),  // WORD JOINER
    ('\u{200B}', ""),  // ZERO WIDTH SPACE
    ('\u{FEFF}', ""),  // BOM
];

static REPLACEMENTS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    GREEK
        .iter()
        .chain(SUBSCRIPTS)
        .chain(SUPERSCRIPTS)
        .chain(SYMBOLS)
        .copied()
        .collect()
});

/// Rewrites Unicode that `pdflatex` cannot typeset into LaTeX sequences.
pub fn sanitize_unicode_math(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENTS.get(&c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Escapes `#` and `&` everywhere in `text`.
///
/// Meant for title/author/date material. It also escapes alignment `&` in
/// `tabular` environments and re-escapes characters that already carry a
/// backslash, so it must not be run over hand-written LaTeX bodies.
pub fn sanitize_headers(text: &str) -> String {
    text.replace('#', r"\#").replace('&', r"\&")
}

/// Which transforms [`sanitize_file_in_place`] applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub headers: bool,
    pub unicode_math: bool,
}

impl SanitizeOptions {
    pub const HEADERS: SanitizeOptions = SanitizeOptions {
        headers: true,
        unicode_math: false,
    };
    pub const UNICODE_MATH: SanitizeOptions = SanitizeOptions {
        headers: false,
        unicode_math: true,
    };
}

/// Applies the selected transforms (unicode-math first, then headers) to a file.
///
/// Returns `Ok(true)` only if the file was rewritten. A missing file is left
/// alone and reported as unchanged.
pub fn sanitize_file_in_place(path: &Path, options: SanitizeOptions) -> io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let src = fs::read_to_string(path)?;
    let mut dst = src.clone();
    if options.unicode_math {
        dst = sanitize_unicode_math(&dst);
    }
    if options.headers {
        dst = sanitize_headers(&dst);
    }
    if dst == src {
        return Ok(false);
    }
    fs::write(path, dst)?;
    Ok(true)
}
