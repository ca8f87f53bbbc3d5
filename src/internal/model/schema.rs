//! DDL for bound models, rendered by the ORM's query builder.

use sea_orm::Statement;
use sea_orm::sea_query::{Alias, ColumnDef, ForeignKey, Table, TableCreateStatement};

use super::{AssociationKind, FieldDef, FieldKind, ModelHandle};

fn column(field: &FieldDef) -> ColumnDef {
    let mut column = ColumnDef::new(Alias::new(&field.name));
    match field.kind {
        FieldKind::Integer => column.integer(),
        FieldKind::BigInteger => column.big_integer(),
        FieldKind::String => column.string(),
        FieldKind::Text => column.text(),
        FieldKind::Boolean => column.boolean(),
        FieldKind::Float => column.float(),
        FieldKind::Double => column.double(),
        FieldKind::Timestamp => column.timestamp(),
        FieldKind::Uuid => column.uuid(),
        FieldKind::Json => column.json(),
        FieldKind::Binary => column.binary(),
    };
    if !field.nullable {
        column.not_null();
    }
    if field.unique {
        column.unique_key();
    }
    if field.primary_key {
        column.primary_key();
    }
    column
}

impl ModelHandle {
    /// `CREATE TABLE IF NOT EXISTS` for this model, with a foreign key per
    /// resolved `belongs_to` association.
    pub fn table_create(&self) -> TableCreateStatement {
        let mut table = Table::create();
        table.table(Alias::new(self.table())).if_not_exists();
        for field in self.fields() {
            table.col(&mut column(field));
        }
        for association in self
            .associations()
            .iter()
            .filter(|a| a.kind == AssociationKind::BelongsTo)
        {
            table.foreign_key(
                ForeignKey::create()
                    .from(Alias::new(self.table()), Alias::new(&association.foreign_key))
                    .to(
                        Alias::new(&association.target_table),
                        Alias::new(&association.references),
                    ),
            );
        }
        table
    }

    /// The create statement rendered for the backend this model is bound to,
    /// or `None` for an unbound model.
    pub fn create_table_statement(&self) -> Option<Statement> {
        self.backend()
            .map(|backend| backend.build(&self.table_create()))
    }
}
