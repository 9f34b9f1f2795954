use byteorder::{LittleEndian, WriteBytesExt};

/// Hand-assembles flat log bytes, one field at a time, so tests can build
/// both valid files and deliberately broken ones.
#[derive(Default)]
pub struct FlatBytes {
    buf: Vec<u8>,
}

impl FlatBytes {
    pub fn new(entry_count: u64) -> Self {
        let mut b = Self::default();
        b.count(entry_count);
        b
    }

    pub fn count(&mut self, n: u64) -> &mut Self {
        self.buf.write_u64::<LittleEndian>(n).unwrap();
        self
    }

    pub fn flag(&mut self, flag: u8) -> &mut Self {
        self.buf.write_u8(flag).unwrap();
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn string(&mut self, s: &[u8]) -> &mut Self {
        self.count(s.len() as u64).raw(s)
    }

    pub fn numeric(&mut self, name: &str, values: &[f64]) -> &mut Self {
        self.flag(1).string(name.as_bytes()).count(values.len() as u64);
        for v in values {
            self.buf.write_f64::<LittleEndian>(*v).unwrap();
        }
        self
    }

    /// `""` entries are written with length 0, i.e. as missing samples.
    pub fn categorical(&mut self, name: &str, values: &[&str]) -> &mut Self {
        self.flag(0).string(name.as_bytes()).count(values.len() as u64);
        for v in values {
            self.string(v.as_bytes());
        }
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// Compares two f64 slices bit for bit (NaN-safe).
pub fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}
