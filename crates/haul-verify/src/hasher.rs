use digest::Digest;

/// Incremental hash state. Object safe so the algorithm can be picked at runtime.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

/// Adapter from any RustCrypto [`Digest`] to [`Hasher`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn finalize(self: Box<Self>) -> Vec<u8> { self.0.finalize().to_vec() }
}

pub type Md5Hasher = DigestHasher<md5::Md5>;
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;
pub type Sha224Hasher = DigestHasher<sha2::Sha224>;
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
pub type Sha384Hasher = DigestHasher<sha2::Sha384>;
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hasher_matches_known_vector() {
        let mut hasher: Box<dyn Hasher> = Box::new(Sha256Hasher::new());
        hasher.update(b"hello world");
        let hash = hasher.finalize();

        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn split_updates_equal_single_update() {
        let mut split: Box<dyn Hasher> = Box::new(Sha1Hasher::new());
        split.update(b"hel");
        split.update(b"lo");

        let mut whole: Box<dyn Hasher> = Box::new(Sha1Hasher::new());
        whole.update(b"hello");

        assert_eq!(split.finalize(), whole.finalize());
    }
}
