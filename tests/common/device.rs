//! Test signing device.

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey, EcPoint, EcPointRef};
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509NameBuilder, X509};
use tse_log_validator::{DeviceCertificate, SignatureAlgorithm, SignatureScheme};

/// EC key pair with a self-signed certificate.
pub struct TestDevice {
    key: EcKey<Private>,
    x509: X509,
    pub certificate: DeviceCertificate,
}

impl TestDevice {
    /// P-256 device.
    pub fn new() -> Self {
        Self::with_curve(Nid::X9_62_PRIME256V1)
    }

    pub fn with_curve(nid: Nid) -> Self {
        let group = EcGroup::from_curve_name(nid).expect("curve");
        let key = EcKey::generate(&group).expect("key generation");
        let pkey = PKey::from_ec_key(key.clone()).expect("pkey");

        let mut name = X509NameBuilder::new().expect("name builder");
        name.append_entry_by_text("CN", "TSE integration test device")
            .expect("CN");
        name.append_entry_by_text("O", "Test Kasse GmbH").expect("O");
        let name = name.build();

        let mut builder = X509::builder().expect("x509 builder");
        builder.set_version(2).expect("version");
        let serial = BigNum::from_u32(4711)
            .and_then(|n| n.to_asn1_integer())
            .expect("serial");
        builder.set_serial_number(&serial).expect("serial");
        builder.set_subject_name(&name).expect("subject");
        builder.set_issuer_name(&name).expect("issuer");
        builder.set_pubkey(&pkey).expect("pubkey");
        builder
            .set_not_before(&Asn1Time::days_from_now(0).expect("time"))
            .expect("not before");
        builder
            .set_not_after(&Asn1Time::days_from_now(3650).expect("time"))
            .expect("not after");
        builder
            .sign(&pkey, MessageDigest::sha256())
            .expect("self-sign");
        let x509 = builder.build();

        let certificate =
            DeviceCertificate::from_der(&x509.to_der().expect("der")).expect("device certificate");
        Self {
            key,
            x509,
            certificate,
        }
    }

    pub fn key_serial(&self) -> Vec<u8> {
        self.certificate.key_serial().to_vec()
    }

    /// Archive file name the certificate is expected under.
    pub fn certificate_file_name(&self) -> String {
        format!("{}.pem", self.certificate.expected_file_stem())
    }

    pub fn certificate_pem(&self) -> Vec<u8> {
        self.x509.to_pem().expect("pem")
    }

    pub fn certificate_der(&self) -> Vec<u8> {
        self.x509.to_der().expect("der")
    }

    fn order(&self) -> (BigNum, i32) {
        let mut ctx = BigNumContext::new().expect("ctx");
        let mut order = BigNum::new().expect("bn");
        self.key
            .group()
            .order(&mut order, &mut ctx)
            .expect("order");
        let len = order.num_bytes();
        (order, len)
    }

    /// Plain `r || s` signature over `dtbs` with the algorithm named by `symbol`.
    pub fn sign(&self, symbol: &str, dtbs: &[u8]) -> Vec<u8> {
        let algorithm = SignatureAlgorithm::from_symbol(symbol).expect("known algorithm");
        match algorithm.scheme {
            SignatureScheme::EcdsaPlain => self.sign_ecdsa(algorithm, dtbs),
            SignatureScheme::EcsdsaPlain => self.sign_ecsdsa(algorithm, dtbs),
        }
    }

    fn sign_ecdsa(&self, algorithm: SignatureAlgorithm, dtbs: &[u8]) -> Vec<u8> {
        let (_, len) = self.order();
        let digest = algorithm.digest.digest(dtbs).expect("digest");
        let sig = EcdsaSig::sign(&digest, &self.key).expect("ecdsa");
        let mut out = sig.r().to_vec_padded(len).expect("r");
        out.extend(sig.s().to_vec_padded(len).expect("s"));
        out
    }

    fn sign_ecsdsa(&self, algorithm: SignatureAlgorithm, dtbs: &[u8]) -> Vec<u8> {
        let group = self.key.group();
        let (order, len) = self.order();
        let mut ctx = BigNumContext::new().expect("ctx");

        let mut k = BigNum::new().expect("bn");
        order.rand_range(&mut k).expect("nonce");
        let mut q = EcPoint::new(group).expect("point");
        q.mul_generator(group, &k, &ctx).expect("kG");

        let mut input = coordinates(group, &q, &mut ctx);
        input.extend_from_slice(dtbs);
        let r_bytes = algorithm.digest.digest(&input).expect("digest");

        let r = BigNum::from_slice(&r_bytes).expect("r");
        let mut rd = BigNum::new().expect("bn");
        rd.mod_mul(&r, self.key.private_key(), &order, &mut ctx)
            .expect("r*d");
        let mut s = BigNum::new().expect("bn");
        s.mod_add(&k, &rd, &order, &mut ctx).expect("k + r*d");

        let mut out = r_bytes;
        out.extend(s.to_vec_padded(len).expect("s"));
        out
    }
}

fn coordinates(group: &openssl::ec::EcGroupRef, point: &EcPointRef, ctx: &mut BigNumContext) -> Vec<u8> {
    let mut x = BigNum::new().expect("bn");
    let mut y = BigNum::new().expect("bn");
    point
        .affine_coordinates_gfp(group, &mut x, &mut y, ctx)
        .expect("affine");
    let field_len = group.degree().div_ceil(8) as i32;
    let mut out = x.to_vec_padded(field_len).expect("x");
    out.extend(y.to_vec_padded(field_len).expect("y"));
    out
}
