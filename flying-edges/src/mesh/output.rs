//! Mesh output implementation
use super::Mesh;
use std::io::{BufWriter, Write};

impl Mesh {
    /// Writes a binary STL to the given output
    ///
    /// Facet normals are taken from triangle winding; per-point normals (if
    /// present) are not written, since STL has no place for them.
    pub fn write_stl<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        const HEADER: &[u8] = b"Binary STL exported by flying-edges";
        static_assertions::const_assert!(HEADER.len() <= 80);
        out.write_all(HEADER)?;
        out.write_all(&[0u8; 80 - HEADER.len()])?;
        out.write_all(&(self.triangles.len() as u32).to_le_bytes())?;
        for t in &self.triangles {
            let a = self.vertices[t.x];
            let b = self.vertices[t.y];
            let c = self.vertices[t.z];
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(0.0)
                .unwrap_or_else(nalgebra::Vector3::zeros);
            for p in &normal {
                out.write_all(&p.to_le_bytes())?;
            }
            for v in t {
                for p in &self.vertices[*v] {
                    out.write_all(&p.to_le_bytes())?;
                }
            }
            out.write_all(&[0u8; std::mem::size_of::<u16>()])?; // attributes
        }
        out.flush()?;
        Ok(())
    }
}
