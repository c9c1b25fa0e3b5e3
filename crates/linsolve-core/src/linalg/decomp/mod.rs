//! Matrix decompositions.
//!
//! | Decomposition | Module        | Factorization           |
//! |---------------|---------------|-------------------------|
//! | Cholesky      | [`cholesky`]  | `A = L L^T` / `A = R^T R` |
//! | LU            | [`lu`]        | `PA = LU`               |
//! | QR            | [`qr`]        | `A = QR`                |
//! | Pivoted QR    | [`qrp`]       | `AP = QR`               |
//! | SVD           | [`svd`]       | `A = U diag(s) V^T`     |

pub mod cholesky;
pub mod lu;
pub mod qr;
pub mod qrp;
pub mod svd;

pub use cholesky::{
    Blocked, CholeskyDecomposition, CholeskyKernel, CholeskyOutcome, InnerProduct,
};
pub use lu::LuDecomposition;
pub use qr::{QrDecomposition, lstsq};
pub use qrp::QrpDecomposition;
pub use svd::SvdDecomposition;
