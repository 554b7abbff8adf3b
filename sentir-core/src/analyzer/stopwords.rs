//! Spanish stopwords and preserved negations.
//!
//! The effective stopword set is always `base − negations`, so a negation
//! marker can never be filtered even when it also appears in the base list
//! (as "no", "ni", "sin" and "nada" do).

use rustc_hash::FxHashSet;

use super::normalizer::TextNormalizer;

/// Base Spanish stopword list.
#[rustfmt::skip]
pub const SPANISH_STOPWORDS: &[&str] = &[
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "se", "las", "por",
    "un", "para", "con", "no", "una", "su", "al", "lo", "como", "más", "pero",
    "sus", "le", "ya", "o", "este", "sí", "porque", "esta", "entre", "cuando",
    "muy", "sin", "sobre", "también", "me", "hasta", "hay", "donde", "quien",
    "desde", "todo", "nos", "durante", "todos", "uno", "les", "ni", "contra",
    "otros", "ese", "eso", "ante", "ellos", "e", "esto", "mí", "antes",
    "algunos", "qué", "unos", "yo", "otro", "otras", "otra", "él", "tanto",
    "esa", "estos", "mucho", "quienes", "nada", "muchos", "cual", "poco",
    "ella", "estar", "estas", "algunas", "algo", "nosotros", "mi", "mis", "tú",
    "te", "ti", "tu", "tus", "ellas", "nosotras", "vosotros", "vosotras", "os",
    "mío", "mía", "míos", "mías", "tuyo", "tuya", "tuyos", "tuyas", "suyo",
    "suya", "suyos", "suyas", "nuestro", "nuestra", "nuestros", "nuestras",
    "vuestro", "vuestra", "vuestros", "vuestras", "esos", "esas", "estoy",
    "estás", "está", "estamos", "estáis", "están", "esté", "estés", "estemos",
    "estéis", "estén", "estaré", "estarás", "estará", "estaremos", "estaréis",
    "estarán", "estaría", "estarías", "estaríamos", "estaríais", "estarían",
    "estaba", "estabas", "estábamos", "estabais", "estaban", "estuve",
    "estuviste", "estuvo", "estuvimos", "estuvisteis", "estuvieron", "he",
    "has", "ha", "hemos", "habéis", "han", "haya", "hayas", "hayamos",
    "hayáis", "hayan", "habré", "habrás", "habrá", "habremos", "habréis",
    "habrán", "habría", "habrías", "habríamos", "habríais", "habrían", "había",
    "habías", "habíamos", "habíais", "habían", "hube", "hubiste", "hubo",
    "hubimos", "hubisteis", "hubieron", "soy", "eres", "es", "somos", "sois",
    "son", "sea", "seas", "seamos", "seáis", "sean", "seré", "serás", "será",
    "seremos", "seréis", "serán", "sería", "serías", "seríamos", "seríais",
    "serían", "era", "eras", "éramos", "erais", "eran", "fui", "fuiste", "fue",
    "fuimos", "fuisteis", "fueron", "tengo", "tienes", "tiene", "tenemos",
    "tenéis", "tienen", "tenga", "tengas", "tengamos", "tengáis", "tengan",
    "tendré", "tendrás", "tendrá", "tendremos", "tendréis", "tendrán",
    "tendría", "tendrías", "tendríamos", "tendríais", "tendrían", "tenía",
    "tenías", "teníamos", "teníais", "tenían", "tuve", "tuviste", "tuvo",
    "tuvimos", "tuvisteis", "tuvieron", "tener", "tenido", "tenida",
    "tenidos", "tenidas", "tened", "sido", "siendo", "habido", "habiendo",
    "estado", "estados", "estada", "estadas", "estando",
];

/// Negation markers that always survive stopword filtering.
pub const SPANISH_NEGATIONS: &[&str] = &[
    "no", "ni", "nunca", "jamás", "tampoco", "nada", "nadie", "ninguno", "ninguna", "sin",
];

/// Effective stopword set paired with the negations it must never contain.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    stopwords: FxHashSet<String>,
    negations: FxHashSet<String>,
}

impl StopwordSet {
    /// Builds the effective set from a base list and a negation list.
    ///
    /// Both lists are folded with `normalizer` first, so they match text that
    /// went through the same case and diacritic rules. Entries that fold to
    /// an empty string are ignored.
    pub fn new<'a, B, N>(base: B, negations: N, normalizer: &TextNormalizer) -> Self
    where
        B: IntoIterator<Item = &'a str>,
        N: IntoIterator<Item = &'a str>,
    {
        let fold = |word: &str| {
            let folded = normalizer.normalize(word.trim());
            (!folded.is_empty()).then_some(folded)
        };

        let negations: FxHashSet<String> = negations.into_iter().filter_map(fold).collect();
        let stopwords = base
            .into_iter()
            .filter_map(fold)
            .filter(|word| !negations.contains(word))
            .collect();

        Self {
            stopwords,
            negations,
        }
    }

    /// The built-in Spanish lists.
    pub fn spanish(normalizer: &TextNormalizer) -> Self {
        Self::new(
            SPANISH_STOPWORDS.iter().copied(),
            SPANISH_NEGATIONS.iter().copied(),
            normalizer,
        )
    }

    /// Returns `true` if `token` should be dropped.
    #[inline]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Returns `true` if `token` is a preserved negation.
    #[inline]
    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    /// Number of effective stopwords.
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Returns `true` if no stopword is filtered.
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    /// Iterates over the preserved negations.
    pub fn negations(&self) -> impl Iterator<Item = &str> {
        self.negations.iter().map(String::as_str)
    }
}
