/// Size of the account discriminator Anchor prepends to every account
pub const ANCHOR_DISCRIMINATOR: usize = 8;

/// Seed prefix of the offer PDA: ["offer", maker, id (little endian)]
pub const OFFER_SEED: &[u8] = b"offer";
