/// Producer of interleaved `f32` vertex data.
///
/// Providers are packed back to back into shared vertex blocks; `get_vertices`
/// may run on a worker thread.
pub trait VertexProvider: Send + Sync {
    /// Number of `f32` values (not vertices) this provider writes.
    fn vertex_count(&self) -> usize;

    /// Fills `vertices`, whose length is exactly `vertex_count()`.
    fn get_vertices(&self, vertices: &mut [f32]);
}

impl VertexProvider for Vec<f32> {
    fn vertex_count(&self) -> usize {
        self.len()
    }

    fn get_vertices(&self, vertices: &mut [f32]) {
        vertices.copy_from_slice(self);
    }
}
