// Delta transform.
//
// Each byte after the first is replaced by its difference from the previous
// original byte, modulo 256. Decoding is a running sum with the same
// wraparound. Length is always preserved.

/// Delta-encode `input`.
///
/// `out[0] = input[0]`, `out[i] = input[i] - input[i - 1]` (wrapping).
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut prev = 0u8;
    for &b in input {
        out.push(b.wrapping_sub(prev));
        prev = b;
    }
    out
}

/// Reverse [`encode`], returning a new buffer.
pub fn decode(input: &[u8]) -> Vec<u8> {
    let mut out = input.to_vec();
    decode_in_place(&mut out);
    out
}

/// Reverse [`encode`] in place.
///
/// Each position is summed with the already reconstructed byte before it,
/// not the encoded one.
pub fn decode_in_place(buf: &mut [u8]) {
    let mut acc = 0u8;
    for b in buf.iter_mut() {
        acc = acc.wrapping_add(*b);
        *b = acc;
    }
}
