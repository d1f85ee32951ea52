use super::Digester;
use sha2::{Digest, Sha256};

#[derive(Default)]
pub struct Sha256Digester(Sha256);

impl Digester for Sha256Digester {
    fn update(&mut self, buf: &[u8]) {
        self.0.update(buf);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        hex::encode(self.0.finalize())
    }
}
