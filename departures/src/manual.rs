/*!

This is the long-form manual for `departures` and the `bajas` command line tool.

## Input workbook

The workbook is an Excel file (.xlsx) with the following tabs:
* `BaseQuery` the current roster, with all the lines whatever their status
* `Activos` the active roster of the previous period
* `CO` (optional) the manual ledger of organizational changes

It is also possible to pass a directory with `BaseQuery.csv`, `Activos.csv` and
`CO.csv` (`--input-type csv`).

The first row of each tab is the header. The following columns are understood,
whatever the accents and the case:

| field               | headers                                              |
|---------------------|------------------------------------------------------|
| employee id         | `Nº pers.`, `Legajo`, `Employee ID`                  |
| last name           | `Apellido`, `Last name`                              |
| first name          | `Nombre de pila`, `Nombre`, `First name`             |
| line                | `Línea`, `División de personal`, `Line`              |
| category            | `Categoría`, `Category`                              |
| occupation status   | `Status ocupación`, `Status`                         |
| date                | `Desde`, `Fecha`, `Effective from`                   |
| reason              | `Motivo de la medida`, `Motivo`, `Reason`            |

The employee id is required in every tab, and the occupation status is required
in `BaseQuery`.

## Classification

An employee listed in `Activos` and not active in `BaseQuery` has left. It is:

* a **Baja** (system deactivation) when `BaseQuery` lists it as `Dado de baja`.
  The roster stores the first day of the new status, so the date of the baja is
  the day before the `Desde` date: `Desde = 15/03/2024` gives a baja on
  `14/03/2024`.
* a **Cambio Organizativo** when it is not in `BaseQuery` at all. The date and
  the reason are taken from the `CO` tab as is. Without a reason, `Reubicado`
  is used. Without an entry in `CO`, the change is kept with the reason
  `Sin Datos` and no date (this can be turned off with the `drop` policy).
* unclassified when `BaseQuery` lists it with any other status. These are
  listed separately in the report.

The ids are compared after removing the surrounding spaces, so that `1234`,
`1234.0` and `" 01234"` refer to the same person.

## Summary tables

Each table counts the departures by one field in the rows and another one in
the columns. The months are always in calendar order; the lines can follow the
order given in the configuration (`lineOrder`). The rows are sorted from the
largest total to the smallest, and the `TOTAL` row is always the last one.
Empty cells are printed as `-`.

Example:

| Motivo     | Ene 2025 | Feb 2025 | Total |
|------------|----------|----------|-------|
| Renuncia   | 2        | 1        | 3     |
| Reubicado  | -        | 2        | 2     |
| TOTAL      | 2        | 3        | 5     |

*/
