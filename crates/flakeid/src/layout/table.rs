use crate::{BitLayout, Error, Field, FieldOrder, Result};

/// The four field values of one identifier, unshifted.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlakeParts {
    pub random: i64,
    pub tick: i64,
    pub node: i64,
    pub sequence: i64,
}

impl FlakeParts {
    pub const fn get(&self, field: Field) -> i64 {
        match field {
            Field::Random => self.random,
            Field::Time => self.tick,
            Field::Node => self.node,
            Field::Sequence => self.sequence,
        }
    }

    fn set(&mut self, field: Field, value: i64) {
        match field {
            Field::Random => self.random = value,
            Field::Time => self.tick = value,
            Field::Node => self.node = value,
            Field::Sequence => self.sequence = value,
        }
    }
}

/// Bit placement of every field, derived once from a layout and an order.
///
/// The shift of a field is the total width of all fields ranked strictly
/// below it, so the lowest-ranked field starts at bit 0.
///
/// ```
/// use flakeid::{BitLayout, Field, FieldOrder, FieldTable};
///
/// let table = FieldTable::derive(
///     BitLayout::new(0, 41, 10, 12).unwrap(),
///     FieldOrder::DESCENDING,
/// )
/// .unwrap();
///
/// assert_eq!(table.shift(Field::Sequence), 0);
/// assert_eq!(table.shift(Field::Node), 12);
/// assert_eq!(table.shift(Field::Time), 22);
/// assert_eq!(table.mask(Field::Node), 0x3ff << 12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldTable {
    layout: BitLayout,
    order: FieldOrder,
    shifts: [u32; 4],
    max_values: [i64; 4],
}

impl FieldTable {
    /// Computes shifts and masks for every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TiedRanks`] when two fields of non-zero width share a
    /// rank, since both would be assigned the same bit offset.
    pub fn derive(layout: BitLayout, order: FieldOrder) -> Result<Self> {
        for (i, &first) in Field::ALL.iter().enumerate() {
            for &second in &Field::ALL[i + 1..] {
                let tied = order.rank(first) == order.rank(second);
                if tied && layout.width(first) > 0 && layout.width(second) > 0 {
                    return Err(Error::TiedRanks { first, second });
                }
            }
        }

        let mut shifts = [0; 4];
        let mut max_values = [0; 4];
        for field in Field::ALL {
            shifts[field.index()] = Field::ALL
                .iter()
                .filter(|&&lower| order.rank(lower) < order.rank(field))
                .map(|&lower| layout.width(lower))
                .sum();
            max_values[field.index()] = layout.max_value(field);
        }

        Ok(Self {
            layout,
            order,
            shifts,
            max_values,
        })
    }

    pub const fn layout(&self) -> BitLayout {
        self.layout
    }

    pub const fn order(&self) -> FieldOrder {
        self.order
    }

    /// Bit offset of the least significant bit of `field`.
    pub const fn shift(&self, field: Field) -> u32 {
        self.shifts[field.index()]
    }

    /// Largest value `field` can hold, unshifted.
    pub const fn max_value(&self, field: Field) -> i64 {
        self.max_values[field.index()]
    }

    /// Bits occupied by `field` within the identifier.
    pub const fn mask(&self, field: Field) -> i64 {
        self.max_value(field) << self.shift(field)
    }

    /// Packs field values into an identifier. Each value is truncated to the
    /// width of its field.
    pub fn compose(&self, parts: &FlakeParts) -> i64 {
        Field::ALL.iter().fold(0, |raw, &field| {
            raw | ((parts.get(field) & self.max_value(field)) << self.shift(field))
        })
    }

    /// Splits an identifier back into its field values.
    pub fn extract(&self, raw: i64) -> FlakeParts {
        let mut parts = FlakeParts::default();
        for field in Field::ALL {
            parts.set(field, (raw >> self.shift(field)) & self.max_value(field));
        }
        parts
    }
}
