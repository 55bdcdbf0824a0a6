//! ANS-104 data items signed with an Arweave key.
//!
//! Binary layout:
//!
//! ```text
//! sig type (u16 LE) | signature (512) | owner (512)
//! | target flag (0) | anchor flag (1) + anchor (32)
//! | tag count (u64 LE) | tag bytes len (u64 LE) | avro tags | data
//! ```
//!
//! The signature covers the SHA-384 deep hash of
//! `["dataitem", "1", sig type, owner, target, anchor, tags, data]`, and the
//! item id is base64url(SHA-256(signature)).

use rand::RngCore;
use sha2::{Digest, Sha256, Sha384};

use crate::bundlr::{Signer, Tag};
use crate::error::CertError;
use crate::shared::{b64url_encode, TxId};

pub const SIGNATURE_TYPE_ARWEAVE: u16 = 1;
pub const SIGNATURE_LENGTH: usize = 512;
pub const OWNER_LENGTH: usize = 512;
pub const ANCHOR_LENGTH: usize = 32;

pub const MAX_TAGS: usize = 128;
pub const MAX_TAG_NAME_BYTES: usize = 1024;
pub const MAX_TAG_VALUE_BYTES: usize = 3072;

/// Input to [`deep_hash`].
pub enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(Vec<DeepHashChunk<'a>>),
}

/// Arweave deep hash (SHA-384).
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> [u8; 48] {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = [b"blob".as_slice(), data.len().to_string().as_bytes()].concat();
            let mut tagged = Vec::with_capacity(96);
            tagged.extend_from_slice(&Sha384::digest(&tag));
            tagged.extend_from_slice(&Sha384::digest(data));
            sha384(&tagged)
        }
        DeepHashChunk::List(items) => {
            let tag = [b"list".as_slice(), items.len().to_string().as_bytes()].concat();
            let mut acc = sha384(&tag);
            for item in items {
                let mut pair = Vec::with_capacity(96);
                pair.extend_from_slice(&acc);
                pair.extend_from_slice(&deep_hash(item));
                acc = sha384(&pair);
            }
            acc
        }
    }
}

fn sha384(data: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out.copy_from_slice(&Sha384::digest(data));
    out
}

/// Avro encoding of `array<record{name: string, value: string}>`.
///
/// An empty tag list encodes to zero bytes.
pub fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    let mut buf = Vec::new();
    if tags.is_empty() {
        return buf;
    }
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    buf
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

/// Zig-zag varint.
fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z & !0x7f != 0 {
        buf.push(((z & 0x7f) | 0x80) as u8);
        z >>= 7;
    }
    buf.push(z as u8);
}

fn validate_tags(tags: &[Tag]) -> Result<(), CertError> {
    if tags.len() > MAX_TAGS {
        return Err(CertError::Validation(format!(
            "Too many tags: {} (max {})",
            tags.len(),
            MAX_TAGS
        )));
    }
    for tag in tags {
        if tag.name.is_empty() || tag.value.is_empty() {
            return Err(CertError::Validation(format!(
                "Tag name and value must be non-empty ({:?})",
                tag.name
            )));
        }
        if tag.name.len() > MAX_TAG_NAME_BYTES || tag.value.len() > MAX_TAG_VALUE_BYTES {
            return Err(CertError::Validation(format!("Tag too long: {}", tag.name)));
        }
    }
    Ok(())
}

/// Anchor in the form the Bundlr client uses: 16 random bytes as hex.
pub fn random_anchor() -> [u8; ANCHOR_LENGTH] {
    let mut raw = [0u8; ANCHOR_LENGTH / 2];
    rand::thread_rng().fill_bytes(&mut raw);
    let mut anchor = [0u8; ANCHOR_LENGTH];
    anchor.copy_from_slice(hex::encode(raw).as_bytes());
    anchor
}

/// A data item whose signature has not been produced yet.
#[derive(Debug, Clone)]
pub struct UnsignedDataItem {
    owner: Vec<u8>,
    anchor: [u8; ANCHOR_LENGTH],
    tag_count: usize,
    tag_bytes: Vec<u8>,
    data: Vec<u8>,
}

impl UnsignedDataItem {
    pub fn new(
        owner: Vec<u8>,
        tags: &[Tag],
        data: &[u8],
        anchor: [u8; ANCHOR_LENGTH],
    ) -> Result<Self, CertError> {
        if owner.len() != OWNER_LENGTH {
            return Err(CertError::Validation(format!(
                "Owner must be {} bytes, got {}",
                OWNER_LENGTH,
                owner.len()
            )));
        }
        validate_tags(tags)?;
        Ok(Self {
            owner,
            anchor,
            tag_count: tags.len(),
            tag_bytes: encode_tags(tags),
            data: data.to_vec(),
        })
    }

    /// The 48-byte message the wallet must sign.
    pub fn signature_data(&self) -> [u8; 48] {
        let sig_type = SIGNATURE_TYPE_ARWEAVE.to_string();
        deep_hash(&DeepHashChunk::List(vec![
            DeepHashChunk::Blob(b"dataitem"),
            DeepHashChunk::Blob(b"1"),
            DeepHashChunk::Blob(sig_type.as_bytes()),
            DeepHashChunk::Blob(&self.owner),
            DeepHashChunk::Blob(&[]),
            DeepHashChunk::Blob(&self.anchor),
            DeepHashChunk::Blob(&self.tag_bytes),
            DeepHashChunk::Blob(&self.data),
        ]))
    }

    /// Attach a signature and serialize.
    pub fn into_signed(self, signature: Vec<u8>) -> Result<DataItem, CertError> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(CertError::Validation(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                signature.len()
            )));
        }

        let mut bytes = Vec::with_capacity(
            2 + SIGNATURE_LENGTH
                + OWNER_LENGTH
                + 2
                + ANCHOR_LENGTH
                + 16
                + self.tag_bytes.len()
                + self.data.len(),
        );
        bytes.extend_from_slice(&SIGNATURE_TYPE_ARWEAVE.to_le_bytes());
        bytes.extend_from_slice(&signature);
        bytes.extend_from_slice(&self.owner);
        bytes.push(0);
        bytes.push(1);
        bytes.extend_from_slice(&self.anchor);
        bytes.extend_from_slice(&(self.tag_count as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.tag_bytes.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&self.tag_bytes);
        bytes.extend_from_slice(&self.data);

        Ok(DataItem {
            id: TxId::new(b64url_encode(&Sha256::digest(&signature))),
            bytes,
        })
    }
}

/// A signed, serialized data item ready to post to a bundler.
#[derive(Debug, Clone)]
pub struct DataItem {
    id: TxId,
    bytes: Vec<u8>,
}

impl DataItem {
    /// Build and sign a data item with `signer`.
    pub async fn create(
        signer: &dyn Signer,
        owner: Vec<u8>,
        tags: &[Tag],
        data: &[u8],
    ) -> Result<Self, CertError> {
        let unsigned = UnsignedDataItem::new(owner, tags, data, random_anchor())?;
        let signature = signer.sign(&unsigned.signature_data()).await?;
        unsigned.into_signed(signature)
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn test_zigzag_longs() {
        let cases: Vec<(i64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x02]),
            (-1, vec![0x01]),
            (64, vec![0x80, 0x01]),
            (300, vec![0xd8, 0x04]),
        ];
        for (n, expected) in cases {
            let mut buf = Vec::new();
            write_long(&mut buf, n);
            assert_eq!(buf, expected, "encoding {}", n);
        }
    }

    #[test]
    fn test_encode_tags_avro() {
        assert!(encode_tags(&[]).is_empty());
        let bytes = encode_tags(&[Tag::new("a", "b")]);
        assert_eq!(bytes, vec![0x02, 0x02, b'a', 0x02, b'b', 0x00]);
    }

    #[test]
    fn test_deep_hash_distinguishes_structure() {
        let blob = deep_hash(&DeepHashChunk::Blob(b"abc"));
        let list = deep_hash(&DeepHashChunk::List(vec![DeepHashChunk::Blob(b"abc")]));
        let empty_list = deep_hash(&DeepHashChunk::List(vec![]));
        assert_ne!(blob, list);
        assert_ne!(list, empty_list);
        assert_eq!(blob, deep_hash(&DeepHashChunk::Blob(b"abc")));
    }

    #[test]
    fn test_empty_list_is_hash_of_tag() {
        assert_eq!(deep_hash(&DeepHashChunk::List(vec![])), sha384(b"list0"));
    }

    #[test]
    fn test_random_anchor_is_hex() {
        let anchor = random_anchor();
        assert!(anchor.iter().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(random_anchor(), anchor);
    }

    #[test]
    fn test_layout() {
        let tags = [Tag::new("Content-Type", "application/pdf")];
        let unsigned =
            UnsignedDataItem::new(vec![7u8; OWNER_LENGTH], &tags, b"hello", [b'a'; 32]).unwrap();
        let item = unsigned.into_signed(vec![9u8; SIGNATURE_LENGTH]).unwrap();
        let bytes = item.as_bytes();

        assert_eq!(&bytes[..2], &[1, 0]);
        assert!(bytes[2..514].iter().all(|b| *b == 9));
        assert!(bytes[514..1026].iter().all(|b| *b == 7));
        assert_eq!(bytes[1026], 0);
        assert_eq!(bytes[1027], 1);
        assert_eq!(&bytes[1028..1060], &[b'a'; 32]);
        assert_eq!(u64::from_le_bytes(bytes[1060..1068].try_into().unwrap()), 1);
        let tag_len = u64::from_le_bytes(bytes[1068..1076].try_into().unwrap()) as usize;
        assert_eq!(tag_len, encode_tags(&tags).len());
        assert_eq!(&bytes[1076 + tag_len..], b"hello");

        let expected_id = b64url_encode(&Sha256::digest(vec![9u8; SIGNATURE_LENGTH]));
        assert_eq!(item.id().as_str(), expected_id);
    }

    #[test]
    fn test_rejects_bad_lengths_and_tags() {
        assert!(UnsignedDataItem::new(vec![0; 10], &[], b"", [0; 32]).is_err());
        assert!(
            UnsignedDataItem::new(vec![0; OWNER_LENGTH], &[Tag::new("", "x")], b"", [0; 32])
                .is_err()
        );
        let unsigned = UnsignedDataItem::new(vec![0; OWNER_LENGTH], &[], b"", [0; 32]).unwrap();
        assert!(unsigned.into_signed(vec![0; 5]).is_err());
    }

    struct RecordingSigner;

    #[async_trait(?Send)]
    impl Signer for RecordingSigner {
        async fn public_key(&self) -> Result<Vec<u8>, CertError> {
            Ok(vec![1; OWNER_LENGTH])
        }

        async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CertError> {
            assert_eq!(message.len(), 48);
            Ok(message.iter().cycle().take(SIGNATURE_LENGTH).copied().collect())
        }
    }

    #[tokio::test]
    async fn test_create_signs_the_deep_hash() {
        let signer = RecordingSigner;
        let owner = signer.public_key().await.unwrap();
        let item = DataItem::create(&signer, owner, &[Tag::new("Type", "certificate")], b"pdf")
            .await
            .unwrap();
        assert_eq!(item.id().as_str().len(), 43);
        assert!(item.as_bytes().ends_with(b"pdf"));
    }
}
