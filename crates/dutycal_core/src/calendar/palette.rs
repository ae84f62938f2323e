//! Deterministic rubric → color mapping.
//!
//! Rule: a rubric present in the rubric list takes the color at its list
//! position modulo the palette size, so colors wrap around once there are
//! more rubrics than colors. A rubric missing from the list (see
//! `UnknownRubricError`) takes the FNV-1a hash of its name modulo the
//! palette size. Removing a rubric shifts the positions of rubrics listed
//! after it; renaming keeps the position.

pub const DEFAULT_PALETTE: [&str; 8] = [
    "red", "orange", "blue", "green", "purple", "teal", "amber", "pink",
];

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricPalette {
    colors: Vec<String>,
    rubrics: Vec<String>,
}

impl RubricPalette {
    /// Builds a palette over `rubrics` in their insertion order.
    ///
    /// An empty `colors` list falls back to `DEFAULT_PALETTE`.
    pub fn new(colors: &[String], rubrics: &[String]) -> Self {
        let colors = if colors.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            colors.to_vec()
        };
        Self {
            colors,
            rubrics: rubrics.to_vec(),
        }
    }

    pub fn size(&self) -> usize {
        self.colors.len()
    }

    pub fn index_for(&self, rubric: &str) -> usize {
        match self.rubrics.iter().position(|known| known == rubric) {
            Some(position) => position % self.colors.len(),
            None => (fnv1a(rubric) % self.colors.len() as u64) as usize,
        }
    }

    pub fn color_for(&self, rubric: &str) -> &str {
        self.colors[self.index_for(rubric)].as_str()
    }
}

fn fnv1a(value: &str) -> u64 {
    value.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
