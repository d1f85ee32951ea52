use super::Digester;

#[derive(Default)]
pub struct Blake3Digester(blake3::Hasher);

impl Digester for Blake3Digester {
    fn update(&mut self, buf: &[u8]) {
        self.0.update(buf);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        self.0.finalize().to_hex().to_string()
    }
}
