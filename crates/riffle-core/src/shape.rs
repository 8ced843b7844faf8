// Destination shapes.
//
// A destination hands the decoder a `Slot`: a typed mutable view that tells
// the dispatcher which decoder to run. Records describe their chunk-tagged
// fields through a static `FieldDescriptor` table, normally generated by
// `#[derive(ChunkRecord)]`.

use std::any::type_name;

use crate::cursor::FourCc;
use crate::error::Result;

/// Mutable view of a destination value, classified by shape
pub enum Slot<'a> {
    Record(&'a mut dyn Record),
    Collection(&'a mut dyn Collection),
    Fixed(&'a mut [u8]),
    Text(&'a mut String),
    Blob(&'a mut Vec<u8>),
    U32(&'a mut u32),
    I64(&'a mut i64),
    Unsupported(&'static str),
    UnsupportedElement(&'static str),
}

impl Slot<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Record(_) => "record",
            Slot::Collection(_) => "collection",
            Slot::Fixed(_) => "fixed",
            Slot::Text(_) => "text",
            Slot::Blob(_) => "blob",
            Slot::U32(_) => "u32",
            Slot::I64(_) => "i64",
            Slot::Unsupported(_) => "unsupported",
            Slot::UnsupportedElement(_) => "unsupported-element",
        }
    }
}

pub trait Destination {
    fn slot(&mut self) -> Slot<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub id: FourCc,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, id: FourCc) -> Self {
        Self { name, id }
    }
}

/// Composite destination. `fields()[i]` describes the field reached through
/// `field_slot(i)`; declaration order decides which field wins when two share
/// an identifier.
pub trait Record {
    fn fields(&self) -> &'static [FieldDescriptor];
    fn field_slot(&mut self, index: usize) -> Slot<'_>;
}

pub trait Collection {
    fn element_type(&self) -> &'static str;

    fn decode_element(
        &mut self,
        decode: &mut dyn FnMut(&mut dyn Record) -> Result<()>,
    ) -> Result<()>;
}

impl<T: Record + Default> Collection for Vec<T> {
    fn element_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn decode_element(
        &mut self,
        decode: &mut dyn FnMut(&mut dyn Record) -> Result<()>,
    ) -> Result<()> {
        let mut element = T::default();
        decode(&mut element)?;
        self.push(element);
        Ok(())
    }
}

pub trait Element: Sized {
    fn sequence_slot(items: &mut Vec<Self>) -> Slot<'_>;
}

impl<T: Element> Destination for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        T::sequence_slot(self)
    }
}

impl Element for u8 {
    fn sequence_slot(items: &mut Vec<Self>) -> Slot<'_> {
        Slot::Blob(items)
    }
}

/// Slot for a `bytemuck::Pod` value; used by `#[derive(FixedLayout)]`.
pub fn fixed_slot<T: bytemuck::Pod>(value: &mut T) -> Slot<'_> {
    Slot::Fixed(bytemuck::bytes_of_mut(value))
}

impl Destination for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl Destination for u32 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::U32(self)
    }
}

impl Destination for i64 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::I64(self)
    }
}

macro_rules! unsupported_destination {
    ($($t:ty),* $(,)?) => {$(
        impl Destination for $t {
            fn slot(&mut self) -> Slot<'_> {
                Slot::Unsupported(type_name::<$t>())
            }
        }
    )*};
}

unsupported_destination!(bool, u8, i8, u16, i16, i32, u64, f32, f64, char);

macro_rules! unsupported_element {
    ($($t:ty),* $(,)?) => {$(
        impl Element for $t {
            fn sequence_slot(_items: &mut Vec<Self>) -> Slot<'_> {
                Slot::UnsupportedElement(type_name::<$t>())
            }
        }
    )*};
}

unsupported_element!(bool, i8, u16, i16, u32, i32, u64, i64, f32, f64, char, String);

impl<T: Destination> Destination for Box<T> {
    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}
