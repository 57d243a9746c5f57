use std::io::{BufRead, Write};

use log::{debug, trace};

use super::{
    header::{read_header, write_header},
    record::{Decoder, Encoder},
};
use crate::{
    codec::Codec, error::Result, header::Header, location::LocationCursor, record::AlleleDepths,
};

/// Codec for the binary AD representation
#[derive(Debug, Default)]
pub struct BinaryCodec {
    encoder: Encoder,
    decoder: Decoder,
}
impl Codec for BinaryCodec {
    fn read_header<R: BufRead>(&mut self, reader: &mut R) -> Result<Header> {
        let header = read_header(reader)?;
        debug!(
            "read AD header v{:#06x}: {} contigs, {} libraries",
            header.id().version,
            header.contigs().len(),
            header.libraries().len()
        );
        Ok(header)
    }

    fn write_header<W: Write>(&mut self, writer: &mut W, header: &Header) -> Result<()> {
        write_header(writer, header)?;
        debug!(
            "wrote AD header: {} contigs, {} libraries",
            header.contigs().len(),
            header.libraries().len()
        );
        Ok(())
    }

    fn read_record<R: BufRead>(
        &mut self,
        reader: &mut R,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &mut AlleleDepths,
    ) -> Result<bool> {
        if !self.decoder.decode(reader, header, cursor, record)? {
            return Ok(false);
        }
        cursor.advance(record.location());
        trace!("read AD record at {}", record.location());
        Ok(true)
    }

    fn write_record<W: Write>(
        &mut self,
        writer: &mut W,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &AlleleDepths,
    ) -> Result<()> {
        let bytes = self.encoder.encode(record, header, cursor)?;
        writer.write_all(bytes)?;
        cursor.advance(record.location());
        trace!("wrote AD record at {}", record.location());
        Ok(())
    }
}
