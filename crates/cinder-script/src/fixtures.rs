//! Hand-written records shaped like generated ones, for tests

use crate::marshal::{complete_field, expect_table, pop_field, ScriptValue};
use crate::value::{Table, Value};
use cinder_core::reflect::generic_destruct;
use cinder_core::{
    Collection, Component, ComponentInfo, EntityId, FieldFlags, FieldInfo, FieldTag, Reflect,
    Result, Text,
};
use std::mem::{align_of, offset_of, size_of};

#[repr(C)]
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: Text,
    pub weight: f32,
}

#[repr(C)]
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub capacity: i32,
    pub owner: EntityId,
    pub items: Collection<Item>,
}

pub static ITEM_DEFAULT: Item = Item {
    name: Text::EMPTY,
    weight: 1.0,
};
static ITEM_FIELDS: [FieldInfo; 2] = [
    FieldInfo {
        name: "name",
        tag: FieldTag::String,
        flags: FieldFlags::empty(),
        sub_type: None,
        offset: offset_of!(Item, name),
    },
    FieldInfo {
        name: "weight",
        tag: FieldTag::Float,
        flags: FieldFlags::NOT_SERIALIZED,
        sub_type: None,
        offset: offset_of!(Item, weight),
    },
];
pub static ITEM_INFO: ComponentInfo = ComponentInfo {
    name: "Item",
    size: size_of::<Item>(),
    align: align_of::<Item>(),
    default: &ITEM_DEFAULT,
    destruct: item_destruct,
    release_collection: item_release_collection,
    flags: FieldFlags::empty(),
    fields: &ITEM_FIELDS,
};
unsafe fn item_destruct(component: *mut u8) {
    generic_destruct(&ITEM_INFO, component)
}
unsafe fn item_release_collection(collection: *mut u8) {
    (*collection.cast::<Collection<Item>>()).release()
}
impl Default for Item {
    fn default() -> Self {
        ITEM_DEFAULT.clone()
    }
}
unsafe impl Reflect for Item {
    fn info() -> &'static ComponentInfo {
        &ITEM_INFO
    }
}
impl ScriptValue for Item {
    fn push(&self) -> Value {
        let mut table = Table::new();
        table.insert("name".to_string(), self.name.push());
        table.insert("weight".to_string(), self.weight.push());
        Value::Table(table)
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        let table = expect_table(value, path)?;
        Ok(Self {
            name: pop_field(table, path, "name")?,
            weight: pop_field(table, path, "weight")?,
        })
    }

    fn complete(value: &mut Value) {
        if let Value::Table(table) = value {
            let default = Self::default();
            complete_field(table, "name", &default.name);
            complete_field(table, "weight", &default.weight);
        }
    }
}

pub static INVENTORY_DEFAULT: Inventory = Inventory {
    capacity: 8,
    owner: EntityId::NULL,
    items: Collection::new(),
};
static INVENTORY_FIELDS: [FieldInfo; 3] = [
    FieldInfo {
        name: "capacity",
        tag: FieldTag::Int,
        flags: FieldFlags::empty(),
        sub_type: None,
        offset: offset_of!(Inventory, capacity),
    },
    FieldInfo {
        name: "owner",
        tag: FieldTag::EntityRef,
        flags: FieldFlags::empty(),
        sub_type: None,
        offset: offset_of!(Inventory, owner),
    },
    FieldInfo {
        name: "items",
        tag: FieldTag::Subcomponent,
        flags: FieldFlags::IS_COLLECTION,
        sub_type: Some(&ITEM_INFO),
        offset: offset_of!(Inventory, items),
    },
];
pub static INVENTORY_INFO: ComponentInfo = ComponentInfo {
    name: "Inventory",
    size: size_of::<Inventory>(),
    align: align_of::<Inventory>(),
    default: &INVENTORY_DEFAULT,
    destruct: inventory_destruct,
    release_collection: inventory_release_collection,
    flags: FieldFlags::empty(),
    fields: &INVENTORY_FIELDS,
};
unsafe fn inventory_destruct(component: *mut u8) {
    generic_destruct(&INVENTORY_INFO, component)
}
unsafe fn inventory_release_collection(collection: *mut u8) {
    (*collection.cast::<Collection<Inventory>>()).release()
}
impl Default for Inventory {
    fn default() -> Self {
        INVENTORY_DEFAULT.clone()
    }
}
unsafe impl Reflect for Inventory {
    fn info() -> &'static ComponentInfo {
        &INVENTORY_INFO
    }
}
impl Component for Inventory {}
impl ScriptValue for Inventory {
    fn push(&self) -> Value {
        let mut table = Table::new();
        table.insert("capacity".to_string(), self.capacity.push());
        table.insert("owner".to_string(), self.owner.push());
        table.insert("items".to_string(), self.items.push());
        Value::Table(table)
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        let table = expect_table(value, path)?;
        Ok(Self {
            capacity: pop_field(table, path, "capacity")?,
            owner: pop_field(table, path, "owner")?,
            items: pop_field(table, path, "items")?,
        })
    }

    fn complete(value: &mut Value) {
        if let Value::Table(table) = value {
            let default = Self::default();
            complete_field(table, "capacity", &default.capacity);
            complete_field(table, "owner", &default.owner);
            complete_field(table, "items", &default.items);
        }
    }
}
