/// Builds a spectral capture buffer from `(re, im)` pairs at the given
/// stride, padding the rest of each stride with zeros.
pub fn pair_capture(pairs: &[(i8, i8)], divisions: usize) -> Vec<u8> {
    let mut buf = vec![0u8; pairs.len() * divisions];
    for (i, &(re, im)) in pairs.iter().enumerate() {
        buf[divisions * i] = re as u8;
        buf[divisions * i + 1] = im as u8;
    }
    buf
}

pub fn random_capture(len: usize) -> Vec<u8> {
    (0..len).map(|_| rand::random::<u8>()).collect()
}
