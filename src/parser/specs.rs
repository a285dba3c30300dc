use serde::Serialize;

/// Status flags that stand alone in a specs line.
const STATUS_FLAGS: &[&str] = &[
    "VENDIDO",
    "En construcción",
    "Reventa",
    "Sold",
    "Under construction",
    "Resale",
];

const PRICE_PREFIXES: &[&str] = &["Precio:", "Price:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Bedrooms,
    Bathrooms,
    Area,
}

impl Unit {
    fn from_label(label: &str) -> Option<Unit> {
        match label.trim().to_lowercase().as_str() {
            "dormitorios" | "bedrooms" => Some(Unit::Bedrooms),
            "baños" | "banos" | "bathrooms" => Some(Unit::Bathrooms),
            "m2" | "m²" => Some(Unit::Area),
            _ => None,
        }
    }
}

/// Labeled view of a listing's raw spec tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSpecs {
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub area_sqm: Option<String>,
    pub price: Option<String>,
    /// Status flags and unclassified tokens, in order of appearance.
    pub extra_flags: Vec<String>,
}

/// Split a raw specs line on `|`, trimming and dropping empty tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify tokens in one left-to-right pass with one-token lookahead.
///
/// Order per token: status flag, price prefix, value followed by a unit
/// label (consumes the pair), otherwise unclassified.
pub fn parse(tokens: &[String]) -> ParsedSpecs {
    let mut parsed = ParsedSpecs::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].trim();

        if STATUS_FLAGS.contains(&token) {
            parsed.extra_flags.push(token.to_string());
            i += 1;
            continue;
        }

        if let Some(rest) = PRICE_PREFIXES.iter().find_map(|p| token.strip_prefix(p)) {
            parsed.price = Some(rest.trim().to_string());
            i += 1;
            continue;
        }

        match tokens.get(i + 1).and_then(|next| Unit::from_label(next)) {
            Some(unit) => {
                let value = Some(token.to_string());
                match unit {
                    Unit::Bedrooms => parsed.bedrooms = value,
                    Unit::Bathrooms => parsed.bathrooms = value,
                    Unit::Area => parsed.area_sqm = value,
                }
                i += 2;
            }
            None => {
                parsed.extra_flags.push(token.to_string());
                i += 1;
            }
        }
    }

    parsed
}

impl ParsedSpecs {
    /// Known status flags among `extra_flags`, skipping unclassified tokens.
    pub fn status_flags(&self) -> impl Iterator<Item = &str> {
        self.extra_flags
            .iter()
            .map(String::as_str)
            .filter(|t| STATUS_FLAGS.contains(t))
    }

    /// `VENDIDO | 4 Dormitorios | 3 Baños | 224 m² | Precio: 1.200.000 €`
    pub fn display(&self) -> String {
        let mut parts = self.extra_flags.clone();
        if let Some(b) = &self.bedrooms {
            parts.push(format!("{} Dormitorios", b));
        }
        if let Some(b) = &self.bathrooms {
            parts.push(format!("{} Baños", b));
        }
        if let Some(a) = &self.area_sqm {
            parts.push(format!("{} m²", a));
        }
        if let Some(p) = &self.price {
            parts.push(format!("Precio: {} €", p));
        }
        parts.join(" | ")
    }

    /// Condensed form for the retrieval metadata: `4 dorm, 3 baños, 224 m², 1.200.000 €`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(b) = &self.bedrooms {
            parts.push(format!("{} dorm", b));
        }
        if let Some(b) = &self.bathrooms {
            parts.push(format!("{} baños", b));
        }
        if let Some(a) = &self.area_sqm {
            parts.push(format!("{} m²", a));
        }
        if let Some(p) = &self.price {
            parts.push(format!("{} €", p));
        }
        parts.join(", ")
    }
}
