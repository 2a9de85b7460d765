#![no_main]
use ciborium::de::from_reader;
use libfuzzer_sys::fuzz_target;
use linkproof_core::{BlockChain, ChainVerifier, FnSignatureVerifier, PublicKey, Signature};

fuzz_target!(|data: &[u8]| {
    if let Ok(chain) = from_reader::<BlockChain, _>(data) {
        // Decoding must never panic, and neither may walking whatever decoded.
        let v = ChainVerifier::new(FnSignatureVerifier::new(
            |_: &[u8], _: &Signature, _: &PublicKey| true,
        ));
        let _ = v.check_chain(&chain);
    }
});
