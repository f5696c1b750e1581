//! Wire framing for the vecsum protocol.
//!
//! Every message boundary is explicit: the client identifier is a
//! `u32`-length-prefixed UTF-8 frame, the proof is exactly 32 raw bytes, and
//! batch counts/lengths/elements are fixed-width little-endian integers.
//! Nothing here ever treats "whatever one read returned" as a message: a
//! short read at any point is a [`ServerError::ConnectionClosed`], never a
//! silent skip, because byte alignment is unrecoverable once lost.
//!
//! Lengths are validated against their caps before any allocation, in the
//! same spirit as a max-payload check on a packet header.

use crate::config::PROOF_LEN;
use crate::error::{constants, Result, ServerError};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Positive authentication response.
pub const TOKEN_OK: &[u8] = b"OK";

/// Rejection response, identical for every failure cause.
pub const TOKEN_ERR: &[u8] = b"ERR";

/// An early socket close surfaces as `UnexpectedEof` from `read_exact`;
/// everything else stays an I/O error.
fn map_read_err(e: io::Error) -> ServerError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ServerError::ConnectionClosed
    } else {
        ServerError::Io(e)
    }
}

/// Read a little-endian `u32` (vector counts and lengths).
pub async fn read_u32<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin,
{
    reader.read_u32_le().await.map_err(map_read_err)
}

/// Read the length-prefixed client identifier frame.
pub async fn read_client_id<R>(reader: &mut R, max_len: u32) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let len = read_u32(reader).await?;
    if len == 0 {
        return Err(ServerError::Framing(
            constants::ERR_EMPTY_CLIENT_ID.to_string(),
        ));
    }
    if len > max_len {
        return Err(ServerError::OversizedFrame(len as usize, max_len as usize));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(map_read_err)?;

    String::from_utf8(buf)
        .map_err(|_| ServerError::Framing(constants::ERR_CLIENT_ID_NOT_UTF8.to_string()))
}

/// Read the fixed-width raw proof frame.
pub async fn read_proof<R>(reader: &mut R) -> Result<[u8; PROOF_LEN]>
where
    R: AsyncRead + Unpin,
{
    let mut proof = [0u8; PROOF_LEN];
    reader.read_exact(&mut proof).await.map_err(map_read_err)?;
    Ok(proof)
}

/// Read `len` little-endian `i16` elements.
///
/// The caller has already validated `len` against the configured cap; this
/// reads the exact payload or fails. An under-sized payload aborts the
/// session; there is no recovery point at a desynchronized offset.
pub async fn read_elements<R>(reader: &mut R, len: u32) -> Result<Vec<i16>>
where
    R: AsyncRead + Unpin,
{
    let mut raw = vec![0u8; len as usize * 2];
    reader.read_exact(&mut raw).await.map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ServerError::Framing(constants::ERR_SHORT_ELEMENT_READ.to_string())
        } else {
            ServerError::Io(e)
        }
    })?;

    Ok(raw
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Write one vector result, flushed immediately so the client sees it before
/// the next vector is read.
pub async fn write_result<W>(writer: &mut W, result: i16) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&result.to_le_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Write a response token (`OK`/`ERR`, or the salt string).
pub async fn write_token<W>(writer: &mut W, token: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(token).await?;
    writer.flush().await?;
    Ok(())
}
