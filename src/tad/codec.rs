use std::io::{BufRead, Write};

use log::{debug, trace};

use super::{
    header::{read_header, write_header},
    record::{Decoder, Encoder},
};
use crate::{
    codec::Codec, error::Result, header::Header, location::LocationCursor, record::AlleleDepths,
};

/// Codec for the tab-delimited TAD representation
#[derive(Debug, Default)]
pub struct TextCodec {
    encoder: Encoder,
    decoder: Decoder,
}
impl Codec for TextCodec {
    fn read_header<R: BufRead>(&mut self, reader: &mut R) -> Result<Header> {
        let header = read_header(reader)?;
        debug!(
            "read {} header v{}.{}: {} contigs, {} libraries",
            header.id().name,
            header.id().major(),
            header.id().minor(),
            header.contigs().len(),
            header.libraries().len()
        );
        Ok(header)
    }

    fn write_header<W: Write>(&mut self, writer: &mut W, header: &Header) -> Result<()> {
        write_header(writer, header)?;
        debug!(
            "wrote TAD header: {} contigs, {} libraries",
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
        if !self.decoder.decode(reader, header, record)? {
            return Ok(false);
        }
        cursor.advance(record.location());
        trace!("read TAD record at {}", record.location());
        Ok(true)
    }

    fn write_record<W: Write>(
        &mut self,
        writer: &mut W,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &AlleleDepths,
    ) -> Result<()> {
        let line = self.encoder.encode(record, header)?;
        writer.write_all(line)?;
        cursor.advance(record.location());
        trace!("wrote TAD record at {}", record.location());
        Ok(())
    }
}
