use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::mismatch;
use crate::describe::{Member, RecordShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Constructor, Decoder, Encoder, Populator, Validator};
use crate::key::{Tag, Type, TypeKey};
use crate::registry::{
    Category, Constructors, Context, Decoders, Encoders, Factory, Populators, Validators,
};
use crate::value::{Value, ValueKind};

/// Handlers for records, as a [`Value::Map`] keyed by member name.
///
/// Member tags shape the wire form:
///
/// - [`Tag::Skip`]: the member never appears on the wire and keeps its bare
///   value when decoding.
/// - [`Tag::Alias`]: extra names accepted when decoding.
///
/// [`Tag::Inline`] on the record's own key replaces the map with the value of
/// its only member. Inlining a record with any other number of wire members
/// is a [`ResolveError::Broken`].
///
/// Decoding does not build the record itself: it resolves a
/// [`Constructor`] for the bare record and a [`Populator`] that fills it in,
/// so either can be replaced independently.
pub struct RecordFactory;

fn record<C: Category>(ctx: &Context<'_, C>) -> Option<(Type, RecordShape)> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Record(shape) => Some((descriptor.ty(), shape.clone())),
        _ => None,
    }
}

/// Members that appear on the wire.
fn wire_members(shape: &RecordShape) -> impl Iterator<Item = &Member> {
    shape
        .members()
        .iter()
        .filter(|member| !member.key().tags().is_skip())
}

/// Checks an [`Tag::Inline`] request, returning whether the record is inlined.
fn is_inline<C: Category>(ctx: &Context<'_, C>, shape: &RecordShape) -> Result<bool, ResolveError> {
    if !ctx.key().tags().is_inline() {
        return Ok(false);
    }
    match wire_members(shape).count() {
        1 => Ok(true),
        count => Err(ResolveError::broken(
            ctx.key(),
            format!("only a record with exactly one member can be inlined, found {count}"),
        )),
    }
}

/// The key with its default removed, which only concerns the decoder.
fn without_default(key: &TypeKey) -> TypeKey {
    key.with_tags(key.tags().without(|tag| matches!(tag, Tag::Default(_))))
}

// -----------------------------------------------------------------------------
// Factories

impl Factory<Encoders> for RecordFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        let Some((ty, shape)) = record(ctx) else {
            return Ok(None);
        };
        let inline = is_inline(ctx, &shape)?;
        let mut fields = Vec::new();
        for member in wire_members(&shape) {
            let encoder = ctx.with_type(member.key().clone()).force_resolve()?;
            fields.push((member.clone(), encoder));
        }
        Ok(Some(Arc::new(RecordEncoder { ty, fields, inline })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("record")
    }
}

impl Factory<Decoders> for RecordFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        let Some((ty, _)) = record(ctx) else {
            return Ok(None);
        };
        let constructor = ctx
            .category::<Constructors>()
            .with_type(ctx.key().base())
            .force_resolve()?;
        let populator = ctx
            .category::<Populators>()
            .with_type(without_default(ctx.key()))
            .force_resolve()?;
        Ok(Some(Arc::new(RecordDecoder {
            ty,
            constructor,
            populator,
        })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("record")
    }
}

impl Factory<Populators> for RecordFactory {
    fn create(
        &self,
        ctx: &Context<'_, Populators>,
    ) -> Result<Option<Arc<dyn Populator>>, ResolveError> {
        let Some((ty, shape)) = record(ctx) else {
            return Ok(None);
        };
        let inline = is_inline(ctx, &shape)?;
        let mut fields = Vec::new();
        for member in wire_members(&shape) {
            let decoder = ctx
                .category::<Decoders>()
                .with_type(member.key().clone())
                .force_resolve()?;
            let names = core::iter::once(member.name().to_owned())
                .chain(member.key().tags().aliases().map(str::to_owned))
                .collect();
            fields.push(PopulatedField {
                member: member.clone(),
                names,
                decoder,
            });
        }
        Ok(Some(Arc::new(RecordPopulator { ty, fields, inline })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("record")
    }
}

impl Factory<Validators> for RecordFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        let Some((ty, shape)) = record(ctx) else {
            return Ok(None);
        };
        let mut fields = Vec::new();
        for member in wire_members(&shape) {
            if let Some(validator) = ctx.with_type(member.key().clone()).try_resolve()? {
                fields.push((member.clone(), validator));
            }
        }
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Arc::new(RecordValidator { ty, fields })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("record")
    }
}

impl Factory<Constructors> for RecordFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        Ok(record(ctx)
            .map(|(ty, shape)| Arc::new(RecordConstructor { ty, shape }) as Arc<dyn Constructor>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("record")
    }
}

// -----------------------------------------------------------------------------
// Handlers

pub struct RecordEncoder {
    ty: Type,
    fields: Vec<(Member, Arc<dyn Encoder>)>,
    inline: bool,
}

impl Encoder for RecordEncoder {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        let mut entries = Vec::with_capacity(self.fields.len());
        for (member, encoder) in &self.fields {
            let field = member.get(value).ok_or_else(|| mismatch(self.ty))?;
            let encoded = encoder.encode(field).map_err(|e| e.in_field(member.name()))?;
            if self.inline {
                return Ok(encoded);
            }
            if !encoded.is_empty() {
                entries.push((member.name().to_owned(), encoded));
            }
        }
        Ok(Value::Map(entries))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("record `{}`", self.ty))
    }
}

/// Constructs a bare record, then populates it.
pub struct RecordDecoder {
    ty: Type,
    constructor: Arc<dyn Constructor>,
    populator: Arc<dyn Populator>,
}

impl Decoder for RecordDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        let mut value = self.constructor.construct()?;
        self.populator.populate(&mut *value, input)?;
        Ok(value)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("record `{}`", self.ty))
    }
}

struct PopulatedField {
    member: Member,
    /// The member name first, then its aliases.
    names: Vec<String>,
    decoder: Arc<dyn Decoder>,
}

impl PopulatedField {
    fn decode(&self, input: Option<&Value>) -> Result<Box<dyn Any>, CodecError> {
        let name = self.member.name();
        match input {
            Some(input) => self.decoder.decode(input).map_err(|e| e.in_field(name)),
            None => self.decoder.decode(&Value::Empty).map_err(|e| match e.innermost() {
                CodecError::UnexpectedKind {
                    found: ValueKind::Empty,
                    ..
                }
                | CodecError::MissingField { .. } => CodecError::MissingField {
                    field: Cow::Borrowed(name),
                },
                _ => e.in_field(name),
            }),
        }
    }
}

/// Fills a record in place from a map.
///
/// Unknown keys are ignored. An absent member is decoded from
/// [`Value::Empty`], so optional and defaulted members may be left out.
pub struct RecordPopulator {
    ty: Type,
    fields: Vec<PopulatedField>,
    inline: bool,
}

impl Populator for RecordPopulator {
    fn populate(&self, target: &mut dyn Any, input: &Value) -> Result<(), CodecError> {
        if (*target).type_id() != self.ty.id() {
            return Err(mismatch(self.ty));
        }

        if self.inline {
            for field in &self.fields {
                let value = field.decode((!input.is_empty()).then_some(input))?;
                field.member.set(target, value)?;
            }
            return Ok(());
        }

        if !matches!(input, Value::Map(_) | Value::Empty) {
            return Err(CodecError::UnexpectedKind {
                expected: ValueKind::Map,
                found: input.kind(),
            });
        }

        for field in &self.fields {
            let found = field.names.iter().find_map(|name| input.get(name));
            let value = field.decode(found)?;
            field.member.set(target, value)?;
        }
        Ok(())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("record `{}`", self.ty))
    }
}

pub struct RecordValidator {
    ty: Type,
    fields: Vec<(Member, Arc<dyn Validator>)>,
}

impl Validator for RecordValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        for (member, validator) in &self.fields {
            let field = member.get(value).ok_or_else(|| mismatch(self.ty))?;
            validator
                .validate(field)
                .map_err(|e| e.in_field(member.name()))?;
        }
        Ok(())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("record `{}`", self.ty))
    }
}

/// Creates a record with every member at its default.
pub struct RecordConstructor {
    ty: Type,
    shape: RecordShape,
}

impl Constructor for RecordConstructor {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        Ok(self.shape.construct())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("bare `{}`", self.ty))
    }
}
