use super::{ElfReaderContext, string::NAME_BUF_SIZE};
use crate::{
    Error, Result,
    elf::{ElfSymbol, MAX_SYM_SIZE, SectionHeader},
    error::bad_arg,
    input::ElfReader,
};
use core::ffi::CStr;

impl<R: ElfReader> ElfReaderContext<R> {
    /// Number of entries in `symtab` (`sh_size / sh_entsize`).
    ///
    /// Returns 0 when the context is uninitialized or the section has no
    /// entry size.
    #[inline]
    pub fn symbol_count(&self, symtab: &SectionHeader) -> u64 {
        if self.cache.is_none() {
            return 0;
        }
        symtab.entry_count()
    }

    /// Reads symbol `idx` of `symtab`.
    pub fn symbol(&mut self, symtab: &SectionHeader, idx: u64) -> Result<ElfSymbol> {
        let cache = self.cache()?;
        if idx >= self.symbol_count(symtab) {
            return Err(Error::BadIndex);
        }
        let size = cache.class.sym_size();
        let mut buf = [0u8; MAX_SYM_SIZE];
        self.read_record(&mut buf[..size], symtab.sh_offset, idx, symtab.sh_entsize)?;
        Ok(ElfSymbol::parse(&buf, cache.class, cache.order))
    }

    /// Resolves the name of `sym` through the string table in section
    /// `strtab_idx`, normally the symbol table's `sh_link`.
    pub fn symbol_name<'b>(
        &mut self,
        strtab_idx: u32,
        sym: &ElfSymbol,
        buf: &'b mut [u8],
    ) -> Result<&'b CStr> {
        if strtab_idx == 0 {
            return Err(bad_arg("symbol table has no linked string table"));
        }
        self.str_from_table(strtab_idx, sym.st_name, buf)
    }

    /// Scans `symtab` from index 1 and returns the first symbol accepted by
    /// `pred`, or `NotFound`.
    fn find_symbol<F>(&mut self, symtab: &SectionHeader, mut pred: F) -> Result<(u64, ElfSymbol)>
    where
        F: FnMut(&mut Self, &ElfSymbol) -> Result<bool>,
    {
        self.cache()?;
        let count = self.symbol_count(symtab);
        if count == 0 {
            return Err(bad_arg("symbol table is empty"));
        }
        for idx in 1..count {
            let sym = self.symbol(symtab, idx)?;
            if pred(self, &sym)? {
                return Ok((idx, sym));
            }
        }
        Err(Error::NotFound)
    }

    /// Finds the first symbol named `name`, resolving names through the
    /// table's linked string table.
    pub fn symbol_by_name(&mut self, symtab: &SectionHeader, name: &str) -> Result<(u64, ElfSymbol)> {
        let strtab_idx = symtab.sh_link;
        let mut buf = [0u8; NAME_BUF_SIZE];
        self.find_symbol(symtab, |ctx, sym| {
            Ok(ctx.symbol_name(strtab_idx, sym, &mut buf)?.to_bytes() == name.as_bytes())
        })
    }

    /// Finds the first defined function or object symbol whose value is
    /// exactly `addr`.
    pub fn symbol_by_addr_exact(&mut self, symtab: &SectionHeader, addr: u64) -> Result<(u64, ElfSymbol)> {
        self.find_symbol(symtab, |_, sym| {
            Ok(!sym.is_undef() && sym.is_func_or_object() && sym.st_value == addr)
        })
    }

    /// Finds the first defined symbol of any type whose extent
    /// `[st_value, st_value + st_size)` contains `addr`. Zero-sized symbols
    /// never match.
    pub fn symbol_by_addr_range(&mut self, symtab: &SectionHeader, addr: u64) -> Result<(u64, ElfSymbol)> {
        self.find_symbol(symtab, |_, sym| Ok(!sym.is_undef() && sym.contains(addr)))
    }
}
