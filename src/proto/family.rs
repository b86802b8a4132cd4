use indexmap::IndexSet;

use crate::error::EncodingError;

use super::encoding::ProtoEncoding;
use super::literal::ProtoLit;

/// A group of literals sharing one variable id, addressed by coordinates.
///
/// `index_of` maps coordinates to the per-variable index and `coords_of`
/// inverts it. Fetching a literal registers it with the encoding, which is
/// what makes it eligible for translation. A family only addresses the
/// encoding that allocated it (or a clone of it); any other encoding is
/// rejected with `ForeignFamily`.
pub trait Family {
    type Coords;

    fn variable(&self) -> u8;

    /// Id of the allocating encoding.
    fn owner(&self) -> u64;

    fn index_of(&mut self, at: &Self::Coords) -> Result<u32, EncodingError>;

    fn coords_of(&self, index: u32) -> Result<Self::Coords, EncodingError>;

    /// Full coordinate list used for literal labels.
    fn label_coords(&self, at: &Self::Coords) -> Vec<usize>;

    fn lit(&mut self, enc: &mut ProtoEncoding, at: Self::Coords) -> Result<ProtoLit, EncodingError> {
        check_owner(self.owner(), self.variable(), enc)?;
        let index = self.index_of(&at)?;
        enc.literal(self.variable(), index)
    }

    fn named(
        &mut self,
        enc: &mut ProtoEncoding,
        name: &str,
        at: Self::Coords,
    ) -> Result<ProtoLit, EncodingError> {
        check_owner(self.owner(), self.variable(), enc)?;
        let index = self.index_of(&at)?;
        let lit = enc.literal(self.variable(), index)?;
        Ok(lit.named(name, &self.label_coords(&at)))
    }
}

fn check_owner(owner: u64, variable: u8, enc: &ProtoEncoding) -> Result<(), EncodingError> {
    if enc.id() != owner {
        return Err(EncodingError::ForeignFamily(variable));
    }
    Ok(())
}

fn to_index(value: usize) -> Result<u32, EncodingError> {
    u32::try_from(value).map_err(|_| EncodingError::IndexOverflow)
}

fn check_axis(axis: usize, value: usize, size: usize) -> Result<(), EncodingError> {
    if value >= size {
        return Err(EncodingError::CoordinateOutOfRange { axis, value, size });
    }
    Ok(())
}

/// One-dimensional family. A row taken out of a [`Var2`] is a `Var1` with an
/// offset and a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var1 {
    owner: u64,
    variable: u8,
    offset: usize,
    size: Option<usize>,
}

impl Var1 {
    pub(crate) fn new(owner: u64, variable: u8) -> Self {
        Self {
            owner,
            variable,
            offset: 0,
            size: None,
        }
    }
}

impl Family for Var1 {
    type Coords = usize;

    fn variable(&self) -> u8 {
        self.variable
    }

    fn owner(&self) -> u64 {
        self.owner
    }

    fn index_of(&mut self, at: &usize) -> Result<u32, EncodingError> {
        if let Some(size) = self.size {
            check_axis(0, *at, size)?;
        }
        let index = self
            .offset
            .checked_add(*at)
            .ok_or(EncodingError::IndexOverflow)?;
        to_index(index)
    }

    fn coords_of(&self, index: u32) -> Result<usize, EncodingError> {
        let at = (index as usize)
            .checked_sub(self.offset)
            .ok_or(EncodingError::UnknownIndex(index))?;
        if self.size.is_some_and(|size| at >= size) {
            return Err(EncodingError::UnknownIndex(index));
        }
        Ok(at)
    }

    fn label_coords(&self, at: &usize) -> Vec<usize> {
        vec![*at]
    }
}

/// Two-dimensional family laid out row-major with `dim1` columns. When
/// symmetric, `[a, b]` and `[b, a]` fold onto `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var2 {
    owner: u64,
    variable: u8,
    dim1: usize,
    symmetric: bool,
}

impl Var2 {
    pub(crate) fn new(owner: u64, variable: u8, dim1: usize, symmetric: bool) -> Self {
        Self {
            owner,
            variable,
            dim1,
            symmetric,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// The 1D slice `[row, *]` of this family, sharing its variable id.
    pub fn row(&self, row: usize) -> Result<Var1, EncodingError> {
        let offset = row
            .checked_mul(self.dim1)
            .ok_or(EncodingError::IndexOverflow)?;
        Ok(Var1 {
            owner: self.owner,
            variable: self.variable,
            offset,
            size: Some(self.dim1),
        })
    }

    fn fold(&self, at: &[usize; 2]) -> [usize; 2] {
        let [a, b] = *at;
        if self.symmetric && a > b {
            [b, a]
        } else {
            [a, b]
        }
    }
}

impl Family for Var2 {
    type Coords = [usize; 2];

    fn variable(&self) -> u8 {
        self.variable
    }

    fn owner(&self) -> u64 {
        self.owner
    }

    fn index_of(&mut self, at: &[usize; 2]) -> Result<u32, EncodingError> {
        let [a, b] = self.fold(at);
        check_axis(1, b, self.dim1)?;
        let index = a
            .checked_mul(self.dim1)
            .and_then(|v| v.checked_add(b))
            .ok_or(EncodingError::IndexOverflow)?;
        to_index(index)
    }

    fn coords_of(&self, index: u32) -> Result<[usize; 2], EncodingError> {
        if self.dim1 == 0 {
            return Err(EncodingError::UnknownIndex(index));
        }
        let at = [index as usize / self.dim1, index as usize % self.dim1];
        // a symmetric family only hands out [min, max]
        if self.symmetric && at[0] > at[1] {
            return Err(EncodingError::UnknownIndex(index));
        }
        Ok(at)
    }

    fn label_coords(&self, at: &[usize; 2]) -> Vec<usize> {
        at.to_vec()
    }
}

/// Three-dimensional family, row-major over `[_, dim1, dim2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var3 {
    owner: u64,
    variable: u8,
    dim1: usize,
    dim2: usize,
}

impl Var3 {
    pub(crate) fn new(owner: u64, variable: u8, dim1: usize, dim2: usize) -> Self {
        Self {
            owner,
            variable,
            dim1,
            dim2,
        }
    }
}

impl Family for Var3 {
    type Coords = [usize; 3];

    fn variable(&self) -> u8 {
        self.variable
    }

    fn owner(&self) -> u64 {
        self.owner
    }

    fn index_of(&mut self, at: &[usize; 3]) -> Result<u32, EncodingError> {
        let [a, b, c] = *at;
        check_axis(1, b, self.dim1)?;
        check_axis(2, c, self.dim2)?;
        let index = self
            .dim1
            .checked_mul(self.dim2)
            .and_then(|plane| a.checked_mul(plane))
            .and_then(|v| v.checked_add(b * self.dim2 + c))
            .ok_or(EncodingError::IndexOverflow)?;
        to_index(index)
    }

    fn coords_of(&self, index: u32) -> Result<[usize; 3], EncodingError> {
        let plane = match self.dim1.checked_mul(self.dim2) {
            Some(plane) if plane > 0 => plane,
            _ => return Err(EncodingError::UnknownIndex(index)),
        };
        let index = index as usize;
        Ok([index / plane, index / self.dim2 % self.dim1, index % self.dim2])
    }

    fn label_coords(&self, at: &[usize; 3]) -> Vec<usize> {
        at.to_vec()
    }
}

/// Open N-dimensional family. Indices are handed out in first-seen order and
/// both directions are cached, so any coordinate tuple of the right arity is
/// addressable without declaring sizes up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarN {
    owner: u64,
    variable: u8,
    arity: usize,
    seen: IndexSet<Vec<usize>>,
}

impl VarN {
    pub(crate) fn new(owner: u64, variable: u8, arity: usize) -> Self {
        Self {
            owner,
            variable,
            arity,
            seen: IndexSet::new(),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of distinct coordinate tuples addressed so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// A view over the tuples starting with `prefix`, addressed by the
    /// remaining coordinates. The view stores nothing of its own.
    pub fn prefixed(&mut self, prefix: Vec<usize>) -> Result<Prefixed<'_>, EncodingError> {
        if prefix.len() > self.arity {
            return Err(EncodingError::ArityMismatch {
                expected: self.arity,
                got: prefix.len(),
            });
        }
        Ok(Prefixed { base: self, prefix })
    }

    fn lookup(&mut self, at: &[usize]) -> Result<u32, EncodingError> {
        if at.len() != self.arity {
            return Err(EncodingError::ArityMismatch {
                expected: self.arity,
                got: at.len(),
            });
        }
        if let Some(index) = self.seen.get_index_of(at) {
            return to_index(index);
        }
        let index = to_index(self.seen.len())?;
        self.seen.insert(at.to_vec());
        Ok(index)
    }
}

impl Family for VarN {
    type Coords = Vec<usize>;

    fn variable(&self) -> u8 {
        self.variable
    }

    fn owner(&self) -> u64 {
        self.owner
    }

    fn index_of(&mut self, at: &Vec<usize>) -> Result<u32, EncodingError> {
        self.lookup(at)
    }

    fn coords_of(&self, index: u32) -> Result<Vec<usize>, EncodingError> {
        self.seen
            .get_index(index as usize)
            .cloned()
            .ok_or(EncodingError::UnknownIndex(index))
    }

    fn label_coords(&self, at: &Vec<usize>) -> Vec<usize> {
        at.clone()
    }
}

#[derive(Debug)]
pub struct Prefixed<'a> {
    base: &'a mut VarN,
    prefix: Vec<usize>,
}

impl Prefixed<'_> {
    fn full(&self, at: &[usize]) -> Vec<usize> {
        let mut full = Vec::with_capacity(self.prefix.len() + at.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(at);
        full
    }
}

impl Family for Prefixed<'_> {
    type Coords = Vec<usize>;

    fn variable(&self) -> u8 {
        self.base.variable
    }

    fn owner(&self) -> u64 {
        self.base.owner
    }

    fn index_of(&mut self, at: &Vec<usize>) -> Result<u32, EncodingError> {
        let expected = self.base.arity - self.prefix.len();
        if at.len() != expected {
            return Err(EncodingError::ArityMismatch {
                expected,
                got: at.len(),
            });
        }
        let full = self.full(at);
        self.base.lookup(&full)
    }

    fn coords_of(&self, index: u32) -> Result<Vec<usize>, EncodingError> {
        let full = self.base.coords_of(index)?;
        if !full.starts_with(&self.prefix) {
            return Err(EncodingError::PrefixMismatch(index));
        }
        Ok(full[self.prefix.len()..].to_vec())
    }

    fn label_coords(&self, at: &Vec<usize>) -> Vec<usize> {
        self.full(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var2_is_row_major() {
        let mut v = Var2::new(0, 0, 4, false);
        assert_eq!(v.index_of(&[2, 3]).expect("index"), 11);
        assert_eq!(v.coords_of(11).expect("coords"), [2, 3]);
        assert!(matches!(
            v.index_of(&[0, 4]),
            Err(EncodingError::CoordinateOutOfRange { axis: 1, .. })
        ));
    }

    #[test]
    fn var3_inverts() {
        let mut v = Var3::new(0, 1, 3, 5);
        let index = v.index_of(&[2, 1, 4]).expect("index");
        assert_eq!(index, 2 * 15 + 5 + 4);
        assert_eq!(v.coords_of(index).expect("coords"), [2, 1, 4]);
    }

    #[test]
    fn row_view_offsets_into_parent() {
        let mut grid = Var2::new(0, 3, 6, false);
        let mut row = grid.row(2).expect("row");
        assert_eq!(row.variable(), 3);
        assert_eq!(
            row.index_of(&4).expect("row index"),
            grid.index_of(&[2, 4]).expect("grid index")
        );
        assert_eq!(row.coords_of(16).expect("coords"), 4);
        assert!(row.coords_of(3).is_err());
        assert!(row.index_of(&6).is_err());
    }

    #[test]
    fn varn_assigns_in_first_seen_order() {
        let mut v = VarN::new(0, 0, 2);
        assert_eq!(v.index_of(&vec![9, 9]).expect("index"), 0);
        assert_eq!(v.index_of(&vec![1, 2]).expect("index"), 1);
        assert_eq!(v.index_of(&vec![9, 9]).expect("index"), 0);
        assert_eq!(v.coords_of(1).expect("coords"), vec![1, 2]);
        assert_eq!(v.coords_of(2), Err(EncodingError::UnknownIndex(2)));
        assert!(matches!(
            v.index_of(&vec![1]),
            Err(EncodingError::ArityMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn prefixed_view_shares_storage() {
        let mut v = VarN::new(0, 5, 3);
        v.index_of(&vec![0, 0, 0]).expect("index");
        let index = {
            let mut view = v.prefixed(vec![7]).expect("view");
            let index = view.index_of(&vec![1, 2]).expect("view index");
            assert_eq!(view.coords_of(index).expect("coords"), vec![1, 2]);
            assert_eq!(view.coords_of(0), Err(EncodingError::PrefixMismatch(0)));
            index
        };
        assert_eq!(index, 1);
        assert_eq!(v.len(), 2);
        assert_eq!(v.coords_of(index).expect("coords"), vec![7, 1, 2]);
    }

    #[test]
    fn symmetric_family_only_inverts_canonical_pairs() {
        let mut v = Var2::new(0, 0, 4, true);
        assert!(v.is_symmetric());
        let index = v.index_of(&[3, 1]).expect("index");
        assert_eq!(index, 7);
        assert_eq!(v.coords_of(index).expect("coords"), [1, 3]);
        assert_eq!(v.coords_of(13), Err(EncodingError::UnknownIndex(13)));
        assert_eq!(v.coords_of(5).expect("diagonal"), [1, 1]);
        assert!(!Var2::new(0, 0, 4, false).is_symmetric());
        assert_eq!(
            Var2::new(0, 0, 4, false).coords_of(13).expect("coords"),
            [3, 1]
        );
    }

    #[test]
    fn family_rejects_other_encoding() {
        let mut first = ProtoEncoding::new();
        let mut second = ProtoEncoding::new();
        second.var1().expect("var");
        let mut x = first.var1().expect("var");
        assert_eq!(
            x.lit(&mut second, 0),
            Err(EncodingError::ForeignFamily(0))
        );
        assert_eq!(second.registered_count(), 0);
        assert!(x.lit(&mut first, 0).is_ok());

        let mut copy = first.clone();
        assert!(x.lit(&mut copy, 1).is_ok());
        let mut grid = first.var_n(2).expect("var");
        let mut view = grid.prefixed(vec![1]).expect("view");
        assert!(matches!(
            view.named(&mut second, "g", vec![0]),
            Err(EncodingError::ForeignFamily(_))
        ));
    }
}
